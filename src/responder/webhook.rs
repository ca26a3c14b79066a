//! Webhook implementation of the response generator
//!
//! Posts each user message to an n8n-style workflow webhook and maps the
//! response into a [`BotReply`]. The webhook saves both the user message and
//! the reply on the backend, so this client performs no writes of its own.

use crate::auth::UserId;
use crate::config::ResponderConfig;
use crate::error::{ChatlingError, Result};
use crate::responder::{BotReply, ResponseGenerator};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

/// Webhook response generator client
///
/// # Examples
///
/// ```no_run
/// use chatling::config::ResponderConfig;
/// use chatling::responder::WebhookResponder;
///
/// let config = ResponderConfig {
///     webhook_url: "https://bots.example.com/webhook/send-message".to_string(),
///     auth_token: "tok".to_string(),
///     timeout_seconds: 120,
/// };
/// let responder = WebhookResponder::new(&config);
/// assert!(responder.is_ok());
/// ```
pub struct WebhookResponder {
    client: Client,
    url: Url,
    auth_token: String,
}

/// Success body returned by the webhook
#[derive(Debug, Deserialize)]
struct WebhookReply {
    id: String,
    content: String,
    created_at: DateTime<Utc>,
}

/// Error-shaped body the webhook may return on both 2xx and non-2xx
#[derive(Debug, Default, Deserialize)]
struct WebhookErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl WebhookResponder {
    /// Create a new webhook responder client
    ///
    /// # Errors
    ///
    /// Returns `ChatlingError::Config` when the webhook URL does not parse,
    /// or `ChatlingError::Responder` when the HTTP client cannot be built.
    pub fn new(config: &ResponderConfig) -> Result<Self> {
        let url = Url::parse(&config.webhook_url).map_err(|e| {
            ChatlingError::Config(format!(
                "invalid responder webhook URL '{}': {}",
                config.webhook_url, e
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("chatling/0.1.0")
            .build()
            .map_err(|e| {
                ChatlingError::Responder(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!("Initialized webhook responder: url={}", url);

        Ok(Self {
            client,
            url,
            auth_token: config.auth_token.clone(),
        })
    }
}

#[async_trait]
impl ResponseGenerator for WebhookResponder {
    async fn generate_reply(
        &self,
        conversation_id: &str,
        content: &str,
        user: &UserId,
    ) -> Result<BotReply> {
        let payload = json!({
            "body": {
                "input": {
                    "chat_id": conversation_id,
                    "content": content,
                },
                "x-hasura-user-id": user.as_str(),
            }
        });

        // Label transport failures here: downstream classification matches
        // on the error text, and reqwest's own wording names neither
        // "timeout" nor "network".
        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.auth_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatlingError::Responder(format!("request timeout: {}", e))
                } else if e.is_connect() {
                    ChatlingError::Responder(format!("connection failed: {}", e))
                } else {
                    ChatlingError::Responder(format!("network error: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the error text the workflow put in the body; fall back
            // to the HTTP status line.
            let fallback = format!("HTTP error! status: {}", status.as_u16());
            let body: WebhookErrorBody = response.json().await.unwrap_or_default();
            let message = body.error.or(body.message).unwrap_or(fallback);
            return Err(ChatlingError::Responder(message).into());
        }

        let body: serde_json::Value = response.json().await?;
        if let Some(error) = body.get("error").and_then(|v| v.as_str()) {
            return Err(ChatlingError::Responder(error.to_string()).into());
        }

        let reply: WebhookReply = serde_json::from_value(body)
            .map_err(|e| ChatlingError::Responder(format!("malformed reply: {}", e)))?;

        tracing::debug!(
            "Received bot reply {} for conversation {}",
            reply.id,
            conversation_id
        );

        Ok(BotReply {
            id: reply.id,
            content: reply.content,
            created_at: reply.created_at,
        })
    }
}
