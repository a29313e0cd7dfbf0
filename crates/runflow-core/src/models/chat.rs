//! Coach conversation messages.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One entry of the coach transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Append-only coach transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Transcript(Vec<ChatMessage>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a message; ids follow insertion order.
    pub fn push(&mut self, role: ChatRole, text: impl Into<String>) -> &ChatMessage {
        let message = ChatMessage {
            id: (self.0.len() + 1).to_string(),
            role,
            text: text.into(),
            timestamp: Timestamp::now().as_millisecond(),
        };
        self.0.push(message);
        &self.0[self.0.len() - 1]
    }

    /// Drop every message after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.0
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ChatMessage>> for Transcript {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self(messages)
    }
}
