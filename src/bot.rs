use log::*;
use std::sync::Arc;

use crate::chat::{ChatError, ChatMessage, ChatSource};
use crate::command_table::CommandTable;
use crate::votes::CommandQueue;

/// Turns chat messages into votes for the next round.
pub struct ChatBot {
    table: CommandTable,
    queue: Arc<CommandQueue>,
}

impl ChatBot {
    pub fn new(table: CommandTable, queue: Arc<CommandQueue>) -> ChatBot {
        ChatBot { table, queue }
    }

    /// Returns whether the message was counted as a vote.
    pub fn handle_message(&self, message: &ChatMessage) -> bool {
        info!("{}: {}", message.user, message.text);

        let Some(command) = self.table.parse(&message.text) else {
            return false;
        };

        let description = command.description.clone();
        if let Some(previous) = self.queue.submit(&message.user, command) {
            debug!(
                "{} changed vote from {:?} to {:?}",
                message.user, previous.description, description
            );
        } else {
            debug!(
                "{} voted for {:?}, {} votes pending",
                message.user,
                description,
                self.queue.len()
            );
        }
        true
    }

    /// Feeds every message from `source` into the queue until the stream ends.
    pub async fn listen<S: ChatSource>(&self, source: &mut S) -> Result<(), ChatError> {
        while let Some(message) = source.next_message().await? {
            self.handle_message(&message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::console_chat::ConsoleSource;
    use crate::command::Screen;

    fn bot() -> (ChatBot, Arc<CommandQueue>) {
        let queue = Arc::new(CommandQueue::new());
        let table = CommandTable::new(Screen::default()).unwrap();
        (ChatBot::new(table, Arc::clone(&queue)), queue)
    }

    fn message(user: &str, text: &str) -> ChatMessage {
        ChatMessage {
            user: user.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn chatter_is_not_a_vote() {
        let (bot, queue) = bot();
        assert!(!bot.handle_message(&message("foo", "gg everyone")));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn only_latest_vote_per_user_counts() {
        let (bot, queue) = bot();
        assert!(bot.handle_message(&message("foo", "click")));
        assert!(bot.handle_message(&message("foo", "Undo")));
        assert!(bot.handle_message(&message("bar", "undo")));

        let results = queue.tally();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].command.description, "Undo move");
        assert_eq!(results[0].users, vec!["bar", "foo"]);
    }

    #[tokio::test]
    async fn listen_consumes_the_whole_stream() {
        let (bot, queue) = bot();
        let input: &[u8] = b"foo: click\nbar: hello\nbaz: click\nqux: mouse 100 100\n";
        let mut source = ConsoleSource::new(input);

        bot.listen(&mut source).await.unwrap();

        assert_eq!(queue.len(), 3);
        let results = queue.tally();
        assert_eq!(results[0].command.description, "Click the mouse");
        assert_eq!(results[0].votes, 2);
    }
}
