use log::*;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::chat::{ChatError, ChatMessage, ChatSink, ChatSource};
use crate::config::Credentials;

pub const TWITCH_IRC_ADDR: &str = "irc.chat.twitch.tv:6667";

// numeric reply sent once the server accepted the login
const RPL_WELCOME: &str = "001";

#[derive(Debug, PartialEq, Eq)]
enum IrcLine<'a> {
    Ping(&'a str),
    PrivMsg { user: &'a str, text: &'a str },
    Notice(&'a str),
    Welcome,
    Other,
}

fn parse_line(line: &str) -> IrcLine<'_> {
    let mut rest = line.trim_end_matches(['\r', '\n']);

    // tags are only sent when requested, skip them if they show up anyway
    if rest.starts_with('@') {
        rest = rest.split_once(' ').map_or("", |(_, r)| r);
    }

    let mut prefix = "";
    if let Some(stripped) = rest.strip_prefix(':') {
        let (p, r) = stripped.split_once(' ').unwrap_or((stripped, ""));
        prefix = p;
        rest = r;
    }

    let (command, params) = rest.split_once(' ').unwrap_or((rest, ""));
    let trailing = match params.split_once(':') {
        Some((_, trailing)) => trailing,
        // no trailing parameter, the last middle one carries the text
        None => params.rsplit(' ').next().unwrap_or(params),
    };

    match command {
        "PING" => IrcLine::Ping(trailing),
        "PRIVMSG" => IrcLine::PrivMsg {
            user: prefix.split('!').next().unwrap_or(prefix),
            text: trailing,
        },
        "NOTICE" => IrcLine::Notice(trailing),
        RPL_WELCOME => IrcLine::Welcome,
        _ => IrcLine::Other,
    }
}

/// Write half of the channel connection.
pub struct TwitchSink<W = OwnedWriteHalf> {
    channel: String,
    writer: Arc<Mutex<W>>,
}

impl<W> Clone for TwitchSink<W> {
    fn clone(&self) -> Self {
        TwitchSink {
            channel: self.channel.clone(),
            writer: Arc::clone(&self.writer),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send> TwitchSink<W> {
    async fn send_raw(&self, line: &str) -> Result<(), ChatError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\r\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

impl<W: AsyncWrite + Unpin + Send> ChatSink for TwitchSink<W> {
    async fn say(&self, text: &str) -> Result<(), ChatError> {
        let text = text.replace(['\r', '\n'], " ");
        let text = text.trim();
        debug!("{} <- {}", self.channel, text);
        self.send_raw(&format!("PRIVMSG {} :{}", self.channel, text))
            .await
    }
}

/// Read half of the channel connection. Answers server pings itself.
pub struct TwitchSource<R = OwnedReadHalf, W = OwnedWriteHalf> {
    lines: Lines<BufReader<R>>,
    sink: TwitchSink<W>,
}

impl<R, W> ChatSource for TwitchSource<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn next_message(&mut self) -> Result<Option<ChatMessage>, ChatError> {
        while let Some(line) = self.lines.next_line().await? {
            match parse_line(&line) {
                IrcLine::PrivMsg { user, text } => {
                    return Ok(Some(ChatMessage {
                        user: user.to_string(),
                        text: text.to_string(),
                    }))
                }
                IrcLine::Ping(server) => {
                    trace!("PING from {}", server);
                    self.sink.send_raw(&format!("PONG :{}", server)).await?;
                }
                IrcLine::Notice(text) => info!("Server notice: {}", text),
                IrcLine::Welcome | IrcLine::Other => trace!("{}", line),
            }
        }

        Ok(None)
    }
}

pub async fn connect(credentials: &Credentials) -> Result<(TwitchSource, TwitchSink), ChatError> {
    info!("Connecting to {}", TWITCH_IRC_ADDR);
    let stream = TcpStream::connect(TWITCH_IRC_ADDR).await?;
    let (reader, writer) = stream.into_split();
    login(reader, writer, credentials).await
}

/// Logs in and joins the channel, returning once the server accepted the
/// login.
pub async fn login<R, W>(
    reader: R,
    writer: W,
    credentials: &Credentials,
) -> Result<(TwitchSource<R, W>, TwitchSink<W>), ChatError>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let sink = TwitchSink {
        channel: format!("#{}", credentials.channel.trim_start_matches('#').to_lowercase()),
        writer: Arc::new(Mutex::new(writer)),
    };

    let token = if credentials.token.starts_with("oauth:") {
        credentials.token.clone()
    } else {
        format!("oauth:{}", credentials.token)
    };
    sink.send_raw(&format!("PASS {}", token)).await?;
    sink.send_raw(&format!("NICK {}", credentials.username.to_lowercase()))
        .await?;

    let mut lines = BufReader::new(reader).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            return Err(ChatError::Closed);
        };
        match parse_line(&line) {
            IrcLine::Welcome => break,
            IrcLine::Notice(text) => return Err(ChatError::Auth(text.to_string())),
            IrcLine::Ping(server) => sink.send_raw(&format!("PONG :{}", server)).await?,
            _ => trace!("{}", line),
        }
    }

    sink.send_raw(&format!("JOIN {}", sink.channel)).await?;
    info!("Joined {} as {}", sink.channel, credentials.username);

    let source = TwitchSource {
        lines,
        sink: sink.clone(),
    };
    Ok((source, sink))
}
