//! Conversation memory shared across queries on one client.

use reag_llm::ChatMessage;
use serde::{Deserialize, Serialize};

/// Ordered, append-only log of chat messages.
///
/// The history is replayed between the system prompt and the user prompt of
/// every later request. It only grows until [`Memory::clear`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    history: Vec<ChatMessage>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    /// Record one user prompt followed by the assistant's answer.
    pub fn add_exchange(&mut self, prompt: impl Into<String>, answer: impl Into<String>) {
        self.add_message(ChatMessage::user(prompt));
        self.add_message(ChatMessage::assistant(answer));
    }

    pub fn get_history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
