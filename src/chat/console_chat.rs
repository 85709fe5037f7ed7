use chrono::Local;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines, Stdin};

use crate::chat::{ChatError, ChatMessage, ChatSink, ChatSource};

const CONSOLE_USER: &str = "console";

/// Reads `user: text` lines, for playing without a chat connection.
/// Lines without a user name are attributed to `console`.
pub struct ConsoleSource<R = Stdin> {
    lines: Lines<BufReader<R>>,
}

impl ConsoleSource {
    pub fn stdin() -> ConsoleSource {
        ConsoleSource::new(tokio::io::stdin())
    }
}

impl<R: AsyncRead + Unpin> ConsoleSource<R> {
    pub fn new(reader: R) -> ConsoleSource<R> {
        ConsoleSource {
            lines: BufReader::new(reader).lines(),
        }
    }
}

fn split_user(line: &str) -> Option<ChatMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (user, text) = match line.split_once(':') {
        Some((user, text)) if !user.trim().is_empty() && !user.contains(' ') => {
            (user.trim(), text.trim())
        }
        _ => (CONSOLE_USER, line),
    };

    Some(ChatMessage {
        user: user.to_string(),
        text: text.to_string(),
    })
}

impl<R: AsyncRead + Unpin + Send> ChatSource for ConsoleSource<R> {
    async fn next_message(&mut self) -> Result<Option<ChatMessage>, ChatError> {
        while let Some(line) = self.lines.next_line().await? {
            if let Some(message) = split_user(&line) {
                return Ok(Some(message));
            }
        }
        Ok(None)
    }
}

/// Prints status reports to stdout with a timestamp.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ChatSink for ConsoleSink {
    async fn say(&self, text: &str) -> Result<(), ChatError> {
        println!("[{}] {}", Local::now().format("%H:%M:%S"), text.trim_end());
        Ok(())
    }
}
