//! Chatling - chat client library for a hosted conversation backend
//!
//! This library provides the client-side core of a chat application whose
//! durable state lives in a remote GraphQL store and whose bot replies come
//! from an external webhook workflow engine.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: the conversation session manager: optimistic state, the
//!   active conversation, title generation, and empty-conversation cleanup
//! - `store`: the conversation store boundary (trait + GraphQL client)
//! - `responder`: the response generator boundary (trait + webhook client)
//! - `auth`: normalized user identity and authentication context
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chatling::auth::{AuthContext, UserId, UserIdentity};
//! use chatling::responder::WebhookResponder;
//! use chatling::session::ChatSession;
//! use chatling::store::GraphqlStore;
//! use chatling::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let auth = AuthContext::authenticated(UserIdentity::new(UserId::new("u-1")));
//!     let session = ChatSession::new(
//!         Arc::new(GraphqlStore::new(&config.store)?),
//!         Arc::new(WebhookResponder::new(&config.responder)?),
//!         auth,
//!         &config.session,
//!     );
//!
//!     session.load_conversations().await;
//!     session.send_message("hi, can you explain nostalgia").await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod responder;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use auth::{AuthContext, UserId, UserIdentity};
pub use config::Config;
pub use error::{ChatlingError, Result};
pub use session::{ChatSession, Conversation, Message, SendStatus, Sender};

#[cfg(test)]
pub mod test_utils;
