//! Conversation store boundary
//!
//! This module defines the [`ConversationStore`] trait the session manager
//! consumes, the wire record types, and the production GraphQL
//! implementation.

pub mod graphql;
pub mod types;

pub use graphql::GraphqlStore;
pub use types::{ConversationRecord, MessageRecord};

use crate::auth::UserId;
use crate::error::Result;
use async_trait::async_trait;

/// Remote, authoritative store of conversations and messages
///
/// The store is the durable owner of record; the session manager treats its
/// own state as an optimistic cache overwritten by store data on every
/// explicit fetch.
///
/// Implementations must be cheap to share (`Send + Sync`); the session
/// manager holds one behind an `Arc` for the lifetime of a session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a conversation for `owner` with the given title
    ///
    /// Returns the persisted record carrying the store-assigned id and
    /// timestamps.
    async fn create_conversation(&self, owner: &UserId, title: &str)
        -> Result<ConversationRecord>;

    /// List all conversations owned by `owner`
    ///
    /// Ordered by most recent activity descending; each record carries its
    /// message count but not its messages.
    async fn list_conversations(&self, owner: &UserId) -> Result<Vec<ConversationRecord>>;

    /// Fetch the full message sequence of a conversation
    ///
    /// Ordered by creation time ascending.
    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<MessageRecord>>;

    /// Rename a conversation and refresh its activity timestamp
    ///
    /// Returns the updated record, or an error when the id does not exist.
    async fn rename_conversation(
        &self,
        conversation_id: &str,
        new_title: &str,
    ) -> Result<ConversationRecord>;

    /// Delete a conversation and all its messages
    ///
    /// Deletion is idempotent: deleting an id that no longer exists is not
    /// an error. In `silent` mode the call is best-effort: failures are
    /// logged at warn level and swallowed, so cleanup sweeps on
    /// unload-style deadlines never propagate errors.
    async fn delete_conversation(&self, conversation_id: &str, silent: bool) -> Result<()>;

    /// Refresh a conversation's last-activity timestamp only
    async fn touch_conversation(&self, conversation_id: &str) -> Result<()>;
}
