pub mod console_chat;
pub mod twitch_chat;

use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub user: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat connection failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("chat connection closed")]
    Closed,
    #[error("chat login rejected: {0}")]
    Auth(String),
}

/// Inbound chat messages.
pub trait ChatSource: Send {
    /// `None` once the stream has ended.
    fn next_message(
        &mut self,
    ) -> impl Future<Output = Result<Option<ChatMessage>, ChatError>> + Send;
}

/// Status reporting back to the channel.
pub trait ChatSink: Send + Sync {
    fn say(&self, text: &str) -> impl Future<Output = Result<(), ChatError>> + Send;
}
