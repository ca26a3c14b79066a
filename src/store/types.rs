//! Wire record types returned by the conversation store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A conversation row as persisted by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Store-assigned opaque identifier
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Owning user id
    pub user_id: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last-activity timestamp
    pub updated_at: DateTime<Utc>,
    /// Authoritative message count; absent in mutation responses
    #[serde(default)]
    pub message_count: u64,
}

/// A message row as persisted by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message identifier
    pub id: String,
    /// Owning conversation id
    pub chat_id: String,
    /// Message text
    pub content: String,
    /// True when the message was authored by the bot
    pub is_bot: bool,
    /// Id of the user the conversation belongs to
    pub user_id: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
