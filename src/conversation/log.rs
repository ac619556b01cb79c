//! Ordered message log for one session

use crate::types::message::{Message, MessageId};
use std::collections::HashSet;

/// Append-only sequence of messages with unique ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageLog {
    messages: Vec<Message>,
    last_id: u64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id: the current unix millis, bumped past anything handed out
    /// before so ids never repeat.
    pub fn next_id(&mut self) -> MessageId {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        self.last_id = now.max(self.last_id + 1);
        MessageId(self.last_id)
    }

    pub fn push(&mut self, message: Message) {
        self.last_id = self.last_id.max(message.id.0);
        self.messages.push(message);
    }

    /// Replace the whole log, reassigning any id that repeats an earlier one
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages.clear();
        self.last_id = messages.iter().map(|m| m.id.0).max().unwrap_or(0).max(self.last_id);

        let mut seen = HashSet::with_capacity(messages.len());
        for mut message in messages {
            if !seen.insert(message.id) {
                message.id = self.next_id();
                seen.insert(message.id);
            }
            self.messages.push(message);
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
