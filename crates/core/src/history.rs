//! Bounded conversation history.
//!
//! Holds the user/assistant pairs of past turns for exactly one agent.
//! When more than `max_turns` pairs are stored the oldest messages are
//! discarded from the front.

use crate::message::{Message, Role};

/// Default number of user/assistant pairs kept.
pub const DEFAULT_MAX_TURNS: usize = 20;

#[derive(Debug, Clone)]
pub struct ConversationHistory {
    max_turns: usize,
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns,
            messages: Vec::new(),
        }
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
        self.truncate();
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
        self.truncate();
    }

    /// Record one completed turn.
    pub fn add_turn(&mut self, query: impl Into<String>, answer: impl Into<String>) {
        self.add_user_message(query);
        self.add_assistant_message(answer);
    }

    /// A copy of the stored messages, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of complete user/assistant pairs.
    pub fn turn_count(&self) -> usize {
        self.messages.len() / 2
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    fn truncate(&mut self) {
        let max_messages = self.max_turns * 2;
        if self.messages.len() > max_messages {
            let excess = self.messages.len() - max_messages;
            self.messages.drain(..excess);
        }
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

impl std::fmt::Display for ConversationHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConversationHistory(turns={}, messages={})",
            self.turn_count(),
            self.len()
        )
    }
}

/// Whether `messages` alternate user/assistant starting with a user message.
pub fn is_paired(messages: &[Message]) -> bool {
    messages.len() % 2 == 0
        && messages.chunks(2).all(|pair| {
            pair[0].role == Role::User && pair[1].role == Role::Assistant
        })
}
