//! Conversation session management
//!
//! This module owns the client-side view of a user's conversations: the
//! conversation set, the single active conversation, optimistic message
//! insertion ahead of remote confirmation, title generation, and
//! empty-conversation cleanup. The remote store and the response generator
//! are consumed through the traits in [`crate::store`] and
//! [`crate::responder`].

pub mod errors;
pub mod manager;
pub mod title;

pub use errors::user_facing_error;
pub use manager::ChatSession;
pub use title::generate_title;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Authored by the signed-in user
    User,
    /// Authored by the bot (including inline error bubbles)
    Bot,
}

/// A single message inside a conversation
///
/// Messages are immutable once created and are only ever removed together
/// with their conversation. Ids are generated client-side so a message can
/// be displayed before the store acknowledges it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Client-generated UUID
    pub id: String,
    /// Message text, non-empty after trimming
    pub content: String,
    /// Who authored the message
    pub sender: Sender,
    /// Client-stamped for user messages, store-stamped for bot replies
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a user message stamped with the current time
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    /// Create a bot message with a fresh local id
    pub fn bot(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            sender: Sender::Bot,
            timestamp,
        }
    }
}

/// A titled, ordered sequence of messages owned by one user
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Store-assigned opaque identifier
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Messages in conversation order; empty until loaded or first send
    pub messages: Vec<Message>,
    /// Timestamp of the most recent mutation
    pub last_activity_at: DateTime<Utc>,
    /// Store-maintained count; lets cleanup detect empty conversations
    /// without loading messages
    pub message_count: u64,
}

impl Conversation {
    /// Whether this conversation is a cleanup candidate
    ///
    /// Empty means no locally known messages and a store-reported count of
    /// zero.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.message_count == 0
    }
}

/// Outcome of a [`ChatSession::send_message`] call
///
/// Send failures are never surfaced as errors; a failed bot round-trip still
/// leaves the user's message (and an inline error bubble) in the
/// conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// User message appended and a bot reply received
    Delivered,
    /// User message appended but the bot round-trip failed; an inline
    /// error bubble was appended in place of the reply
    BotFailed,
    /// Nothing happened: unauthenticated, blank content, or the
    /// conversation could not be created
    Skipped,
}
