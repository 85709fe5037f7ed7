use chrono::Local;
use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::chat::{ChatError, ChatSink};
use crate::command::Command;
use crate::device::{self, Device};
use crate::process::ProcessProbe;
use crate::votes::{select_winner, CommandQueue};

pub const NO_VOTES_MESSAGE: &str = "No votes to process";
pub const TERMINAL_MESSAGE: &str = "You broke it!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The game is gone.
    ProcessExited,
    /// Shutdown was requested through the cancellation channel.
    Cancelled,
}

/// Plays one winning command per round until the game exits.
pub struct CommandScheduler<D, P, S> {
    queue: Arc<CommandQueue>,
    device: D,
    probe: P,
    sink: S,
    round_duration: Duration,
    verbose: bool,
}

impl<D, P, S> CommandScheduler<D, P, S>
where
    D: Device,
    P: ProcessProbe,
    S: ChatSink,
{
    pub fn new(
        queue: Arc<CommandQueue>,
        device: D,
        probe: P,
        sink: S,
        round_duration: Duration,
        verbose: bool,
    ) -> CommandScheduler<D, P, S> {
        CommandScheduler {
            queue,
            device,
            probe,
            sink,
            round_duration,
            verbose,
        }
    }

    /// Runs rounds until the game exits, reporting fails, or `shutdown`
    /// turns true. Every stop other than a requested one is announced in
    /// chat.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<StopReason, ChatError> {
        let result = self.run_rounds(&mut shutdown).await;

        match &result {
            Ok(StopReason::Cancelled) => info!("Scheduler cancelled"),
            Ok(StopReason::ProcessExited) => warn!("Game process is gone"),
            Err(err) => error!("Unable to report to chat: {}", err),
        }

        if !matches!(result, Ok(StopReason::Cancelled)) {
            if let Err(err) = self.sink.say(TERMINAL_MESSAGE).await {
                warn!("Unable to send final message: {}", err);
            }
        }

        result
    }

    async fn run_rounds(
        &self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<StopReason, ChatError> {
        let mut round: u64 = 0;

        loop {
            if *shutdown.borrow() {
                return Ok(StopReason::Cancelled);
            }
            if !self.probe.is_alive() {
                return Ok(StopReason::ProcessExited);
            }

            round += 1;
            self.play_round(round, shutdown).await?;
            if *shutdown.borrow() {
                return Ok(StopReason::Cancelled);
            }

            let seconds = self.round_duration.as_secs();
            self.sink
                .say(&format!("Next command in {} seconds", seconds))
                .await?;

            tokio::select! {
                _ = tokio::time::sleep(self.round_duration) => {}
                Ok(_) = shutdown.wait_for(|stop| *stop) => {}
            }
        }
    }

    async fn play_round(
        &self,
        round: u64,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<(), ChatError> {
        info!("Round {} at {}", round, Local::now().format("%H:%M:%S"));

        // one lock: votes arriving from now on belong to the next round
        let results = self.queue.tally();
        if results.is_empty() {
            info!("{}", NO_VOTES_MESSAGE);
            return self.sink.say(NO_VOTES_MESSAGE).await;
        }

        let count: usize = results.iter().map(|r| r.votes).sum();
        info!("Processing {} votes for {} actions", count, results.len());

        if self.verbose {
            self.sink
                .say(&format!(
                    "Processing {} votes for {} actions",
                    count,
                    results.len()
                ))
                .await?;
            for result in &results {
                self.sink
                    .say(&format!(
                        "{}: {} votes",
                        result.command.description, result.votes
                    ))
                    .await?;
            }
        }

        let Some(winner) = select_winner(&results) else {
            return Ok(());
        };
        info!(
            "Winner: {:?} with {} votes from {:?}",
            winner.command.description, winner.votes, winner.users
        );
        self.sink
            .say(&format!("Result: {}", winner.command.description))
            .await?;

        self.execute(&winner.command, shutdown).await;
        Ok(())
    }

    /// Performs the actions in order. A failing action is logged and the
    /// rest still run; cancellation is checked between actions.
    async fn execute(&self, command: &Command, shutdown: &watch::Receiver<bool>) {
        debug!("Executing {:?} (typed as {:?})", command.description, command.text);
        for (i, action) in command.actions.iter().enumerate() {
            if *shutdown.borrow() {
                info!(
                    "Cancelled {:?} after {} of {} actions",
                    command.description,
                    i,
                    command.actions.len()
                );
                return;
            }

            debug!("Performing {}", action);
            if let Err(err) = device::perform(&self.device, action).await {
                warn!("Action {} failed: {}", action, err);
            }
        }
    }
}
