//! Response generator boundary
//!
//! The response generator is the external workflow engine that produces a
//! bot reply for each user message. It persists both sides of the exchange
//! on its own; this client only learns the reply (or the failure).

pub mod webhook;

pub use webhook::WebhookResponder;

use crate::auth::UserId;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A single bot reply as returned by the generator
#[derive(Debug, Clone)]
pub struct BotReply {
    /// Generator-assigned message id
    pub id: String,
    /// Reply text
    pub content: String,
    /// Store-stamped creation time
    pub created_at: DateTime<Utc>,
}

/// External service producing one bot reply per user message
///
/// Must be treated as possibly slow and possibly failing, and is never
/// assumed idempotent: callers do not retry on ambiguous failure. Failures
/// carry the raw error text so the session manager can classify them into a
/// user-facing message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Generate a reply for `content` within the given conversation
    async fn generate_reply(
        &self,
        conversation_id: &str,
        content: &str,
        user: &UserId,
    ) -> Result<BotReply>;
}
