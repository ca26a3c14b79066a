//! The conversation session manager
//!
//! [`ChatSession`] owns the in-memory conversation set and the single active
//! conversation for one authenticated session. Local state is an optimistic
//! cache: user messages appear immediately, while the store remains the
//! durable owner of record and overwrites local data on every explicit
//! fetch.
//!
//! All state lives behind one async mutex that is never held across a
//! remote call. Mutations are therefore atomic between suspension points,
//! and any other operation may interleave while a remote call is in flight.
//! Every mutation that follows a remote call is keyed by the conversation id
//! captured before the call, never by the current active pointer, so a
//! slow bot reply lands in the conversation it was requested for even if the
//! user has switched away.

use crate::auth::AuthContext;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::responder::ResponseGenerator;
use crate::session::errors::user_facing_error;
use crate::session::title::{generate_title, DEFAULT_TITLE};
use crate::session::{Conversation, Message, Sender, SendStatus};
use crate::store::ConversationStore;

use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mutable session state guarded by the session mutex
struct SessionState {
    /// All conversations known to this session, most recent first
    conversations: Vec<Conversation>,
    /// The currently selected conversation, messages loaded
    active: Option<Conversation>,
    /// True while the optimistic phase of a send runs
    is_sending: bool,
    /// True while a bot reply is awaited
    is_typing: bool,
    /// Embedder hint: network reachable
    online: bool,
    /// Embedder hint: application visible/foregrounded
    foreground: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            conversations: Vec::new(),
            active: None,
            is_sending: false,
            is_typing: false,
            online: true,
            foreground: true,
        }
    }
}

/// Conversation session manager
///
/// Constructed once per authenticated session; consumers hold a (cheap,
/// `Clone`) handle and invoke its operations for every change. Consumers
/// read state through snapshot accessors and never mutate it directly.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use chatling::auth::{AuthContext, UserId, UserIdentity};
/// use chatling::config::Config;
/// use chatling::responder::WebhookResponder;
/// use chatling::session::ChatSession;
/// use chatling::store::GraphqlStore;
///
/// # async fn example() -> chatling::error::Result<()> {
/// let config = Config::default();
/// let auth = AuthContext::authenticated(UserIdentity::new(UserId::new("u-1")));
/// let session = ChatSession::new(
///     Arc::new(GraphqlStore::new(&config.store)?),
///     Arc::new(WebhookResponder::new(&config.responder)?),
///     auth,
///     &config.session,
/// );
/// session.load_conversations().await;
/// session.send_message("hi, can you explain nostalgia").await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChatSession {
    store: Arc<dyn ConversationStore>,
    responder: Arc<dyn ResponseGenerator>,
    auth: AuthContext,
    state: Arc<Mutex<SessionState>>,
    /// Per-conversation gates serializing the remote phase of sends
    send_gates: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    cleanup_delay: Duration,
}

impl ChatSession {
    /// Create a session manager over the given collaborators
    pub fn new(
        store: Arc<dyn ConversationStore>,
        responder: Arc<dyn ResponseGenerator>,
        auth: AuthContext,
        config: &SessionConfig,
    ) -> Self {
        Self {
            store,
            responder,
            auth,
            state: Arc::new(Mutex::new(SessionState::default())),
            send_gates: Arc::new(Mutex::new(HashMap::new())),
            cleanup_delay: Duration::from_millis(config.cleanup_delay_ms),
        }
    }

    /// Fetch the authenticated user's conversations from the store
    ///
    /// Populates the conversation set (counts only, no messages) without
    /// touching the active conversation. Store failures are logged and the
    /// local set is left unchanged, never partially overwritten.
    pub async fn load_conversations(&self) {
        let Some(user_id) = self.auth.user_id() else {
            tracing::warn!("Cannot load conversations without an authenticated user");
            return;
        };

        match self.store.list_conversations(user_id).await {
            Ok(records) => {
                let conversations: Vec<Conversation> = records
                    .into_iter()
                    .map(|record| Conversation {
                        id: record.id,
                        title: record.title,
                        messages: Vec::new(),
                        last_activity_at: record.updated_at,
                        message_count: record.message_count,
                    })
                    .collect();

                tracing::debug!("Loaded {} conversation(s)", conversations.len());
                self.state.lock().await.conversations = conversations;
            }
            Err(e) => tracing::error!("Failed to load conversations: {}", e),
        }
    }

    /// Make a conversation active, loading its messages from the store
    ///
    /// The fetch is always re-issued; the local cache is never trusted for
    /// history. When switching away from a different conversation a delayed
    /// cleanup sweep is scheduled off the interaction path. On fetch failure
    /// the conversation still becomes active with an empty message list so
    /// the UI never hangs on history.
    pub async fn select_conversation(&self, conversation_id: &str) {
        let (schedule_sweep, base) = {
            let state = self.state.lock().await;
            let switching = state
                .active
                .as_ref()
                .map_or(false, |active| active.id != conversation_id);
            let schedule = switching && state.conversations.len() > 1;
            let base = state
                .conversations
                .iter()
                .find(|c| c.id == conversation_id)
                .cloned();
            (schedule, base)
        };

        let Some(base) = base else {
            tracing::warn!("Ignoring select of unknown conversation {}", conversation_id);
            return;
        };

        if schedule_sweep {
            self.schedule_cleanup();
        }

        let messages = match self.store.fetch_messages(&base.id).await {
            Ok(records) => records
                .into_iter()
                .map(|record| Message {
                    id: record.id,
                    content: record.content,
                    sender: if record.is_bot {
                        Sender::Bot
                    } else {
                        Sender::User
                    },
                    timestamp: record.created_at,
                })
                .collect(),
            Err(e) => {
                tracing::error!("Failed to load messages for {}: {}", base.id, e);
                Vec::new()
            }
        };

        let mut state = self.state.lock().await;
        state.active = Some(Conversation { messages, ..base });
    }

    /// Create a conversation, optionally titled from a first message
    ///
    /// On success the new (empty) conversation is prepended to the set and
    /// made active. Returns `None` when unauthenticated or on store failure;
    /// both are logged, never raised, so callers degrade gracefully.
    pub async fn create_conversation(&self, first_message: Option<&str>) -> Option<Conversation> {
        let Some(user_id) = self.auth.user_id() else {
            tracing::warn!("Refusing to create a conversation without an authenticated user");
            return None;
        };

        let title = match first_message {
            Some(text) => generate_title(text),
            None => DEFAULT_TITLE.to_string(),
        };

        match self.store.create_conversation(user_id, &title).await {
            Ok(record) => {
                let conversation = Conversation {
                    id: record.id,
                    title: record.title,
                    messages: Vec::new(),
                    last_activity_at: record.created_at,
                    message_count: 0,
                };

                tracing::debug!("Created conversation {}", conversation.id);
                let mut state = self.state.lock().await;
                state.conversations.insert(0, conversation.clone());
                state.active = Some(conversation.clone());
                Some(conversation)
            }
            Err(e) => {
                tracing::error!("Failed to create conversation: {}", e);
                None
            }
        }
    }

    /// Send a user message, creating a conversation on demand
    ///
    /// The user message is appended optimistically before the response
    /// generator is invoked, so it is visible in history even while the
    /// reply is pending. A failed bot round-trip appends a classified,
    /// user-facing error bubble instead of the reply; it is never raised.
    /// The remote phase is serialized per conversation so overlapping sends
    /// cannot interleave their replies.
    pub async fn send_message(&self, content: &str) -> SendStatus {
        let content = content.trim();
        if content.is_empty() {
            tracing::debug!("Ignoring empty message");
            return SendStatus::Skipped;
        }

        let Some(user_id) = self.auth.user_id().cloned() else {
            tracing::warn!("Refusing to send a message without an authenticated user");
            return SendStatus::Skipped;
        };

        let active_id = self
            .state
            .lock()
            .await
            .active
            .as_ref()
            .map(|active| active.id.clone());

        let conversation_id = match active_id {
            Some(id) => id,
            None => match self.create_conversation(Some(content)).await {
                Some(conversation) => conversation.id,
                None => {
                    tracing::error!("No conversation available for message");
                    return SendStatus::Skipped;
                }
            },
        };

        // Optimistic phase: the user's message must be visible before the
        // generator is invoked.
        {
            let mut state = self.state.lock().await;
            state.is_sending = true;
            Self::append_message(
                &mut state,
                &conversation_id,
                Message::user(content),
                true,
                Some(content),
            );
            state.is_typing = true;
            state.is_sending = false;
        }

        let gate = self.send_gate(&conversation_id).await;
        let _serialized = gate.lock().await;

        let status = match self
            .responder
            .generate_reply(&conversation_id, content, &user_id)
            .await
        {
            Ok(reply) => {
                // The generator persisted both sides; the timestamp touch is
                // a separate best-effort call.
                if let Err(e) = self.store.touch_conversation(&conversation_id).await {
                    tracing::warn!("Failed to refresh conversation timestamp: {}", e);
                }

                let mut state = self.state.lock().await;
                Self::append_message(
                    &mut state,
                    &conversation_id,
                    Message::bot(reply.content, reply.created_at),
                    true,
                    None,
                );
                SendStatus::Delivered
            }
            Err(e) => {
                tracing::error!("Bot reply failed for {}: {}", conversation_id, e);
                let bubble = user_facing_error(&e.to_string());
                let mut state = self.state.lock().await;
                Self::append_message(
                    &mut state,
                    &conversation_id,
                    Message::bot(bubble, Utc::now()),
                    false,
                    None,
                );
                SendStatus::BotFailed
            }
        };

        // Final step regardless of outcome.
        self.state.lock().await.is_typing = false;
        status
    }

    /// Rename a conversation
    ///
    /// Unlike most operations, failures are propagated: the caller performed
    /// an explicit action and must surface the error.
    pub async fn rename_conversation(&self, conversation_id: &str, new_title: &str) -> Result<()> {
        let record = self
            .store
            .rename_conversation(conversation_id, new_title)
            .await?;

        let mut state = self.state.lock().await;
        if let Some(entry) = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            entry.title = record.title.clone();
            entry.last_activity_at = record.updated_at;
        }
        if let Some(active) = state.active.as_mut() {
            if active.id == conversation_id {
                active.title = record.title;
            }
        }
        Ok(())
    }

    /// Delete a conversation and all its messages
    ///
    /// Deletion is idempotent at the store, so deleting an id twice is not
    /// an error. Failures are propagated for explicit user-visible handling.
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        self.store.delete_conversation(conversation_id, false).await?;

        let mut state = self.state.lock().await;
        state.conversations.retain(|c| c.id != conversation_id);
        if state
            .active
            .as_ref()
            .map_or(false, |active| active.id == conversation_id)
        {
            state.active = None;
        }
        Ok(())
    }

    /// Delete abandoned empty conversations, best effort
    ///
    /// A candidate has no locally known messages and a store count of zero.
    /// At least one conversation always survives a pass: with `N` total at
    /// most `N - 1` candidates are deleted, and populated conversations are
    /// never touched. In `silent` mode (visibility-loss and unload triggers)
    /// the pass is skipped entirely when the embedder has flagged the
    /// session offline or backgrounded, since the deletes are unlikely to
    /// complete. All failures are swallowed.
    pub async fn cleanup_empty_conversations(&self, silent: bool) {
        let victims: Vec<String> = {
            let state = self.state.lock().await;
            if silent && (!state.online || !state.foreground) {
                tracing::debug!("Skipping cleanup: offline or backgrounded");
                return;
            }

            let total = state.conversations.len();
            if total == 0 {
                return;
            }

            state
                .conversations
                .iter()
                .filter(|c| c.is_empty())
                .take(total - 1)
                .map(|c| c.id.clone())
                .collect()
        };

        if victims.is_empty() {
            return;
        }
        tracing::debug!("Cleaning up {} empty conversation(s)", victims.len());

        let deletes = victims.into_iter().map(|id| {
            let store = Arc::clone(&self.store);
            async move {
                let result = store.delete_conversation(&id, silent).await;
                (id, result)
            }
        });

        for (id, result) in join_all(deletes).await {
            match result {
                Ok(()) => {
                    let mut state = self.state.lock().await;
                    state.conversations.retain(|c| c.id != id);
                    if state
                        .active
                        .as_ref()
                        .map_or(false, |active| active.id == id)
                    {
                        state.active = None;
                    }
                }
                Err(e) if silent => {
                    tracing::warn!("Failed to clean up conversation {} silently: {}", id, e)
                }
                Err(e) => tracing::error!("Failed to clean up conversation {}: {}", id, e),
            }
        }
    }

    /// Drop the active conversation pointer
    pub async fn clear_active_conversation(&self) {
        self.state.lock().await.active = None;
    }

    /// Snapshot of all conversations known to this session
    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.lock().await.conversations.clone()
    }

    /// Snapshot of the active conversation, messages included
    pub async fn active_conversation(&self) -> Option<Conversation> {
        self.state.lock().await.active.clone()
    }

    /// True while the optimistic phase of a send runs
    pub async fn is_sending(&self) -> bool {
        self.state.lock().await.is_sending
    }

    /// True while a bot reply is awaited
    pub async fn is_typing(&self) -> bool {
        self.state.lock().await.is_typing
    }

    /// Embedder hint used by silent cleanup: network reachability
    pub async fn set_online(&self, online: bool) {
        self.state.lock().await.online = online;
    }

    /// Embedder hint used by silent cleanup: application visibility
    pub async fn set_foreground(&self, foreground: bool) {
        self.state.lock().await.foreground = foreground;
    }

    /// Spawn the delayed cleanup sweep used when switching conversations
    fn schedule_cleanup(&self) {
        let session = self.clone();
        let delay = self.cleanup_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.cleanup_empty_conversations(false).await;
        });
    }

    /// Get or create the send gate of a conversation
    async fn send_gate(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        let mut gates = self.send_gates.lock().await;
        gates
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Append a message to a conversation, keyed by id
    ///
    /// Mirrors the append into both the conversation-set entry and the
    /// active copy when their ids match the captured id. Sets the title from
    /// `title_source` when the conversation had no prior messages.
    fn append_message(
        state: &mut SessionState,
        conversation_id: &str,
        message: Message,
        bump_count: bool,
        title_source: Option<&str>,
    ) {
        let now = Utc::now();

        if let Some(entry) = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            if let Some(text) = title_source {
                if entry.is_empty() {
                    entry.title = generate_title(text);
                }
            }
            entry.messages.push(message.clone());
            if bump_count {
                entry.message_count += 1;
            }
            entry.last_activity_at = now;
        }

        if let Some(active) = state.active.as_mut() {
            if active.id == conversation_id {
                if let Some(text) = title_source {
                    if active.is_empty() {
                        active.title = generate_title(text);
                    }
                }
                active.messages.push(message);
                if bump_count {
                    active.message_count += 1;
                }
                active.last_activity_at = now;
            }
        }
    }
}
