//! Core domain types for TecnoBot conversations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ChatbotError;

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for session identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new time-sortable session identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Role / Message
// ---------------------------------------------------------------------------

/// Author of a chat message, serialized the way chat-completion APIs expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Chronological, append-only list of chat turns for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent `limit` user/assistant messages, oldest first.
    ///
    /// System entries are skipped before the window is taken, so they never
    /// count against `limit`. The stored transcript is left untouched.
    pub fn recent_turns(&self, limit: usize) -> Vec<&Message> {
        let turns: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .collect();
        let start = turns.len().saturating_sub(limit);
        turns[start..].to_vec()
    }
}

impl From<Vec<Message>> for Transcript {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

// ---------------------------------------------------------------------------
// ModelSelection
// ---------------------------------------------------------------------------

/// The fixed set of hosted models a session may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelSelection {
    #[serde(rename = "llama3-8b-8192")]
    Llama3_8b,
    #[default]
    #[serde(rename = "llama3-70b-8192")]
    Llama3_70b,
    #[serde(rename = "mixtral-8x7b-32768")]
    Mixtral8x7b,
}

impl ModelSelection {
    /// Every selectable model, in menu order.
    pub const ALL: [ModelSelection; 3] = [Self::Llama3_8b, Self::Llama3_70b, Self::Mixtral8x7b];

    /// Model identifier as sent to the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llama3_8b => "llama3-8b-8192",
            Self::Llama3_70b => "llama3-70b-8192",
            Self::Mixtral8x7b => "mixtral-8x7b-32768",
        }
    }

    /// One-line hint shown next to the model in selectors.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Llama3_8b => "más rápido",
            Self::Llama3_70b => "más potente",
            Self::Mixtral8x7b => "contexto largo",
        }
    }

    /// Next model in menu order, wrapping around.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous model in menu order, wrapping around.
    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelSelection {
    type Err = ChatbotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                ChatbotError::validation(format!(
                    "unknown model '{wanted}', expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}
