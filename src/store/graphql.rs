//! GraphQL implementation of the conversation store
//!
//! Talks to a Hasura-style GraphQL endpoint over a single POST route using
//! an admin-secret header. All durable conversation state lives behind this
//! client; the session manager only ever sees [`ConversationRecord`] and
//! [`MessageRecord`] values.

use crate::auth::UserId;
use crate::config::StoreConfig;
use crate::error::{ChatlingError, Result};
use crate::store::{ConversationRecord, ConversationStore, MessageRecord};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

/// GraphQL conversation store client
///
/// # Examples
///
/// ```no_run
/// use chatling::config::StoreConfig;
/// use chatling::store::GraphqlStore;
///
/// let config = StoreConfig {
///     endpoint: "https://example.graphql.host/v1".to_string(),
///     admin_secret: "secret".to_string(),
///     delete_timeout_seconds: 5,
/// };
/// let store = GraphqlStore::new(&config);
/// assert!(store.is_ok());
/// ```
pub struct GraphqlStore {
    client: Client,
    endpoint: Url,
    admin_secret: String,
    delete_timeout: Duration,
}

/// Envelope of every GraphQL response
#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorEntry>>,
}

/// Single entry of a GraphQL errors array
#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

/// Conversation row joined with its message-count aggregate
#[derive(Debug, Deserialize)]
struct ChatRow {
    id: String,
    title: String,
    user_id: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    messages_aggregate: MessagesAggregate,
}

#[derive(Debug, Deserialize)]
struct MessagesAggregate {
    aggregate: AggregateCount,
}

#[derive(Debug, Deserialize)]
struct AggregateCount {
    count: u64,
}

const CREATE_CHAT: &str = r#"
mutation CreateChat($user_id: uuid!, $title: String!) {
  insert_chats_one(object: {
    user_id: $user_id,
    title: $title,
    created_at: "now()",
    updated_at: "now()"
  }) {
    id
    title
    user_id
    created_at
    updated_at
  }
}"#;

const LIST_CHATS: &str = r#"
query GetUserChats($user_id: uuid!) {
  chats(
    where: { user_id: { _eq: $user_id } }
    order_by: { updated_at: desc }
  ) {
    id
    title
    user_id
    created_at
    updated_at
    messages_aggregate {
      aggregate {
        count
      }
    }
  }
}"#;

const GET_MESSAGES: &str = r#"
query GetChatMessages($chat_id: uuid!) {
  messages(
    where: { chat_id: { _eq: $chat_id } }
    order_by: { created_at: asc }
  ) {
    id
    chat_id
    content
    is_bot
    user_id
    created_at
  }
}"#;

const RENAME_CHAT: &str = r#"
mutation RenameChat($chat_id: uuid!, $title: String!) {
  update_chats_by_pk(
    pk_columns: { id: $chat_id }
    _set: { title: $title, updated_at: "now()" }
  ) {
    id
    title
    user_id
    created_at
    updated_at
  }
}"#;

const DELETE_CHAT: &str = r#"
mutation DeleteChat($chat_id: uuid!) {
  delete_messages(where: { chat_id: { _eq: $chat_id } }) {
    affected_rows
  }
  delete_chats_by_pk(id: $chat_id) {
    id
  }
}"#;

const TOUCH_CHAT: &str = r#"
mutation UpdateChatTimestamp($chat_id: uuid!) {
  update_chats_by_pk(
    pk_columns: { id: $chat_id }
    _set: { updated_at: "now()" }
  ) {
    id
  }
}"#;

impl GraphqlStore {
    /// Create a new GraphQL store client
    ///
    /// # Errors
    ///
    /// Returns `ChatlingError::Config` when the endpoint does not parse as a
    /// URL, or `ChatlingError::Store` when the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            ChatlingError::Config(format!("invalid store endpoint '{}': {}", config.endpoint, e))
        })?;

        let client = Client::builder()
            .user_agent("chatling/0.1.0")
            .build()
            .map_err(|e| ChatlingError::Store(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized GraphQL store: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint,
            admin_secret: config.admin_secret.clone(),
            delete_timeout: Duration::from_secs(config.delete_timeout_seconds),
        })
    }

    /// Execute a GraphQL document and return the `data` object
    async fn execute(&self, query: &str, variables: Value) -> Result<Value> {
        self.execute_with_timeout(query, variables, None).await
    }

    /// Execute a GraphQL document with an optional per-request timeout
    async fn execute_with_timeout(
        &self,
        query: &str,
        variables: Value,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header("x-hasura-admin-secret", &self.admin_secret)
            .json(&json!({ "query": query, "variables": variables }));

        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatlingError::Store(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed")
            ))
            .into());
        }

        let body: GraphqlResponse = response.json().await?;
        extract_data(body)
    }

    /// Deserialize a named field out of a `data` object
    fn field<T: serde::de::DeserializeOwned>(data: &Value, name: &str) -> Result<T> {
        let value = data
            .get(name)
            .cloned()
            .ok_or_else(|| ChatlingError::Store(format!("response missing '{}'", name)))?;
        serde_json::from_value(value)
            .map_err(|e| ChatlingError::Store(format!("malformed '{}': {}", name, e)).into())
    }
}

/// Map a GraphQL envelope to its data object, surfacing the errors array
fn extract_data(body: GraphqlResponse) -> Result<Value> {
    if let Some(errors) = body.errors {
        if let Some(first) = errors.first() {
            return Err(ChatlingError::Store(first.message.clone()).into());
        }
    }
    body.data
        .ok_or_else(|| ChatlingError::Store("response carried no data".to_string()).into())
}

#[async_trait]
impl ConversationStore for GraphqlStore {
    async fn create_conversation(
        &self,
        owner: &UserId,
        title: &str,
    ) -> Result<ConversationRecord> {
        let data = self
            .execute(
                CREATE_CHAT,
                json!({ "user_id": owner.as_str(), "title": title }),
            )
            .await?;

        let record: ConversationRecord = Self::field(&data, "insert_chats_one")?;
        tracing::debug!("Created conversation {}", record.id);
        Ok(record)
    }

    async fn list_conversations(&self, owner: &UserId) -> Result<Vec<ConversationRecord>> {
        let data = self
            .execute(LIST_CHATS, json!({ "user_id": owner.as_str() }))
            .await?;

        let rows: Vec<ChatRow> = Self::field(&data, "chats")?;
        Ok(rows
            .into_iter()
            .map(|row| ConversationRecord {
                id: row.id,
                title: row.title,
                user_id: row.user_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
                message_count: row.messages_aggregate.aggregate.count,
            })
            .collect())
    }

    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<MessageRecord>> {
        let data = self
            .execute(GET_MESSAGES, json!({ "chat_id": conversation_id }))
            .await?;
        Self::field(&data, "messages")
    }

    async fn rename_conversation(
        &self,
        conversation_id: &str,
        new_title: &str,
    ) -> Result<ConversationRecord> {
        let data = self
            .execute(
                RENAME_CHAT,
                json!({ "chat_id": conversation_id, "title": new_title }),
            )
            .await?;

        if data.get("update_chats_by_pk").map_or(true, Value::is_null) {
            return Err(ChatlingError::Store(format!(
                "conversation {} not found",
                conversation_id
            ))
            .into());
        }
        Self::field(&data, "update_chats_by_pk")
    }

    async fn delete_conversation(&self, conversation_id: &str, silent: bool) -> Result<()> {
        // A null delete_chats_by_pk means the row was already gone; the
        // delete is idempotent so that is still a success.
        let result = self
            .execute_with_timeout(
                DELETE_CHAT,
                json!({ "chat_id": conversation_id }),
                Some(self.delete_timeout),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if silent => {
                tracing::warn!("Silent delete failed for conversation {}: {}", conversation_id, e);
                Ok(())
            }
            Err(e) => {
                if let Some(http) = e.downcast_ref::<reqwest::Error>() {
                    if http.is_timeout() {
                        return Err(ChatlingError::Store(
                            "Delete operation timed out. Please try again.".to_string(),
                        )
                        .into());
                    }
                }
                Err(e)
            }
        }
    }

    async fn touch_conversation(&self, conversation_id: &str) -> Result<()> {
        self.execute(TOUCH_CHAT, json!({ "chat_id": conversation_id }))
            .await?;
        Ok(())
    }
}
