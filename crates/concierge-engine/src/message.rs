//! Message types for the assistant conversation.
//!
//! A [`Message`] is immutable once built: the store hands out shared
//! references only, and no setters exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quick_action::QuickAction;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The simulated (or service-backed) investment assistant.
    Assistant,
    /// The person using the chat panel.
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assistant => write!(f, "assistant"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Identifier of a message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap an identifier issued elsewhere (e.g. by the conversation service).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues message ids derived from the creation time in milliseconds.
///
/// Ids are strictly increasing: a timestamp that does not move past the
/// previously issued one is bumped by a millisecond.
#[derive(Debug, Clone, Default)]
pub struct MessageIdGenerator {
    last_millis: i64,
}

impl MessageIdGenerator {
    /// Create a generator with no ids issued yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue an id for a message created at `created_at`.
    pub fn next_at(&mut self, created_at: DateTime<Utc>) -> MessageId {
        let millis = created_at.timestamp_millis().max(self.last_millis + 1);
        self.last_millis = millis;
        MessageId(millis.to_string())
    }
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    quick_actions: Vec<QuickAction>,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message.
    pub fn user(id: MessageId, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            quick_actions: Vec::new(),
            created_at,
        }
    }

    /// Create an assistant message.
    pub fn assistant(id: MessageId, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: content.into(),
            quick_actions: Vec::new(),
            created_at,
        }
    }

    /// Attach quick-action triggers (only the welcome message carries them).
    #[must_use]
    pub fn with_quick_actions(mut self, actions: impl IntoIterator<Item = QuickAction>) -> Self {
        self.quick_actions = actions.into_iter().collect();
        self
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn quick_actions(&self) -> &[QuickAction] {
        &self.quick_actions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the user authored this message.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
