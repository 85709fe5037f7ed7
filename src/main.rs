use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Builder;
use log::{error, info, warn, LevelFilter};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

mod bot;
mod chat;
mod command;
mod command_scheduler;
mod command_table;
mod config;
mod device;
mod grid;
mod process;
mod votes;

use bot::ChatBot;
use chat::console_chat::{ConsoleSink, ConsoleSource};
use chat::{twitch_chat, ChatSink, ChatSource};
use command::Screen;
use command_scheduler::{CommandScheduler, StopReason};
use command_table::CommandTable;
use config::Credentials;
use device::dry_run_device::DryRunDevice;
use device::xdotool_device::XdotoolDevice;
use device::Device;
use process::{PidProbe, ProcessProbe};
use votes::CommandQueue;

/// Largest window size or offset accepted on the command line, in pixels.
const MAX_EXTENT: i64 = 65_535;

/// Lets a chat vote on what happens next in a running game.
#[derive(Parser)]
struct Args {
    /// Process id of the running game
    pid: u32,
    /// Seconds between two executed commands
    #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    round_secs: u64,
    #[arg(long, default_value_t = 1280, value_parser = clap::value_parser!(i32).range(1..=MAX_EXTENT))]
    width: i32,
    #[arg(long, default_value_t = 720, value_parser = clap::value_parser!(i32).range(1..=MAX_EXTENT))]
    height: i32,
    /// Horizontal position of the game viewport on the desktop
    #[arg(
        long,
        default_value_t = 0,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-MAX_EXTENT..=MAX_EXTENT)
    )]
    x_offset: i32,
    /// Vertical position of the game viewport on the desktop, title bar included
    #[arg(
        long,
        default_value_t = 45,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-MAX_EXTENT..=MAX_EXTENT)
    )]
    y_offset: i32,
    /// Report the full vote breakdown to chat and log at debug level
    #[arg(short, long)]
    verbose: bool,
    #[arg(short, long, value_enum, default_value = "xdotool")]
    device: DeviceKind,
    #[arg(short, long, value_enum, default_value = "twitch")]
    chat: ChatKind,
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
enum DeviceKind {
    #[default]
    Xdotool,
    DryRun,
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
enum ChatKind {
    #[default]
    Twitch,
    Console,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut builder = Builder::new();
    builder.filter_level(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    // RUST_LOG still wins for anything it names
    builder.parse_default_env();
    builder.init();

    match run(args).await {
        Ok(StopReason::Cancelled) => ExitCode::SUCCESS,
        Ok(StopReason::ProcessExited) => {
            error!("Game process exited, stopping");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<StopReason> {
    let probe = PidProbe::new(args.pid);
    if !probe.is_alive() {
        bail!("Could not find process with ID {}", probe.pid());
    }

    match args.device {
        DeviceKind::Xdotool => run_with_device(args, probe, XdotoolDevice::new()).await,
        DeviceKind::DryRun => run_with_device(args, probe, DryRunDevice).await,
    }
}

async fn run_with_device<D: Device>(
    args: Args,
    probe: PidProbe,
    device: D,
) -> anyhow::Result<StopReason> {
    if let Err(err) = device.activate(args.pid).await {
        warn!("Unable to bring the game window to the front: {}", err);
    }

    let screen = Screen {
        width: args.width,
        height: args.height,
        x_offset: args.x_offset,
        y_offset: args.y_offset,
    };
    let table = CommandTable::new(screen).context("building command table")?;
    let queue = Arc::new(CommandQueue::new());
    let bot = ChatBot::new(table, Arc::clone(&queue));

    let round_duration = Duration::from_secs(args.round_secs);

    match args.chat {
        ChatKind::Twitch => {
            let credentials = Credentials::from_env()?;
            let (source, sink) = twitch_chat::connect(&credentials)
                .await
                .context("connecting to twitch chat")?;
            let scheduler =
                CommandScheduler::new(queue, device, probe, sink, round_duration, args.verbose);
            serve(bot, source, scheduler).await
        }
        ChatKind::Console => {
            let scheduler = CommandScheduler::new(
                queue,
                device,
                probe,
                ConsoleSink,
                round_duration,
                args.verbose,
            );
            serve(bot, ConsoleSource::stdin(), scheduler).await
        }
    }
}

async fn serve<C, D, S>(
    bot: ChatBot,
    mut source: C,
    scheduler: CommandScheduler<D, PidProbe, S>,
) -> anyhow::Result<StopReason>
where
    C: ChatSource + 'static,
    D: Device,
    S: ChatSink,
{
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let listener = tokio::spawn(async move {
        match bot.listen(&mut source).await {
            Ok(()) => warn!("Chat stream ended, no more votes will arrive"),
            Err(err) => error!("Chat stream failed: {}", err),
        }
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, finishing the current action");
            let _ = shutdown_tx.send(true);
        }
    });

    let reason = scheduler.run(shutdown_rx).await?;
    listener.abort();
    Ok(reason)
}
