//! Shared fakes for integration tests
//!
//! `MemoryStore` is a stateful in-memory conversation store and
//! `ScriptedResponder` replays a queue of canned outcomes, so session flows
//! can be exercised end to end without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use chatling::auth::{AuthContext, UserId, UserIdentity};
use chatling::error::{ChatlingError, Result};
use chatling::responder::{BotReply, ResponseGenerator};
use chatling::store::{ConversationRecord, ConversationStore, MessageRecord};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Build an authenticated context for tests
pub fn auth(user_id: &str) -> AuthContext {
    AuthContext::authenticated(UserIdentity::new(UserId::new(user_id)))
}

#[derive(Default)]
struct MemoryStoreState {
    next_id: usize,
    conversations: Vec<ConversationRecord>,
    messages: HashMap<String, Vec<MessageRecord>>,
}

/// Stateful in-memory conversation store
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryStoreState>,
    /// Number of fetch_messages calls observed
    pub fetch_calls: AtomicUsize,
    /// Number of delete_conversation calls observed
    pub delete_calls: AtomicUsize,
    /// When set, touch_conversation fails
    pub fail_touch: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a conversation with a given store-side message count
    pub fn seed_conversation(&self, id: &str, title: &str, message_count: u64) {
        let mut state = self.state.lock().unwrap();
        state.conversations.push(ConversationRecord {
            id: id.to_string(),
            title: title.to_string(),
            user_id: "u-1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            message_count,
        });
        state.messages.entry(id.to_string()).or_default();
    }

    /// Seed a stored message for a conversation
    pub fn seed_message(&self, chat_id: &str, content: &str, is_bot: bool) {
        let mut state = self.state.lock().unwrap();
        let list = state.messages.entry(chat_id.to_string()).or_default();
        let message = MessageRecord {
            id: format!("m-{}", list.len() + 1),
            chat_id: chat_id.to_string(),
            content: content.to_string(),
            is_bot,
            user_id: "u-1".to_string(),
            created_at: Utc::now(),
        };
        list.push(message);
    }

    /// Whether a conversation id still exists in the store
    pub fn contains(&self, id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .conversations
            .iter()
            .any(|c| c.id == id)
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create_conversation(
        &self,
        owner: &UserId,
        title: &str,
    ) -> Result<ConversationRecord> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let record = ConversationRecord {
            id: format!("c-{}", state.next_id),
            title: title.to_string(),
            user_id: owner.as_str().to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            message_count: 0,
        };
        state.conversations.insert(0, record.clone());
        state.messages.entry(record.id.clone()).or_default();
        Ok(record)
    }

    async fn list_conversations(&self, owner: &UserId) -> Result<Vec<ConversationRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .conversations
            .iter()
            .filter(|c| c.user_id == owner.as_str())
            .cloned()
            .collect())
    }

    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<MessageRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn rename_conversation(
        &self,
        conversation_id: &str,
        new_title: &str,
    ) -> Result<ConversationRecord> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| {
                ChatlingError::Store(format!("conversation {} not found", conversation_id))
            })?;
        record.title = new_title.to_string();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_conversation(&self, conversation_id: &str, _silent: bool) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        // Idempotent: deleting an absent id is still a success.
        state.conversations.retain(|c| c.id != conversation_id);
        state.messages.remove(conversation_id);
        Ok(())
    }

    async fn touch_conversation(&self, conversation_id: &str) -> Result<()> {
        if self.fail_touch.load(Ordering::SeqCst) {
            return Err(ChatlingError::Store("touch rejected".to_string()).into());
        }
        let mut state = self.state.lock().unwrap();
        if let Some(record) = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            record.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// One scripted outcome of a responder call
pub enum ScriptedReply {
    /// Reply with the given text
    Reply(String),
    /// Sleep, then reply; lets tests overlap in-flight sends
    ReplyAfter(String, Duration),
    /// Fail with the given raw error text
    Error(String),
}

/// Response generator replaying a queue of scripted outcomes
///
/// Calls beyond the script echo the user's message, so tests only script
/// the interesting outcomes.
#[derive(Default)]
pub struct ScriptedResponder {
    script: Mutex<VecDeque<ScriptedReply>>,
    /// Number of generate_reply calls observed
    pub calls: AtomicUsize,
}

impl ScriptedResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: ScriptedReply) {
        self.script.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl ResponseGenerator for ScriptedResponder {
    async fn generate_reply(
        &self,
        _conversation_id: &str,
        content: &str,
        _user: &UserId,
    ) -> Result<BotReply> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().unwrap().pop_front();

        let reply = |text: String| BotReply {
            id: format!("r-{}", call + 1),
            content: text,
            created_at: Utc::now(),
        };

        match scripted {
            None => Ok(reply(format!("echo: {}", content))),
            Some(ScriptedReply::Reply(text)) => Ok(reply(text)),
            Some(ScriptedReply::ReplyAfter(text, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(reply(text))
            }
            Some(ScriptedReply::Error(text)) => Err(ChatlingError::Responder(text).into()),
        }
    }
}
