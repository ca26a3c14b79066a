/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `chat`          — Interactive chat session
- `conversations` — List a user's conversations

These handlers are intentionally thin presentation and use the library
components: the session manager and the two boundary clients.
*/

use crate::auth::{AuthContext, UserId, UserIdentity};
use crate::error::Result;

/// Resolve an authentication context from a CLI-supplied user id
///
/// The CLI stands in for the real sign-in flow: it receives an
/// already-resolved user id (flag or environment). A missing or blank id
/// yields an anonymous context; session operations then refuse as no-ops
/// instead of erroring.
pub fn resolve_auth(user_id: Option<String>) -> AuthContext {
    match user_id {
        Some(id) if !id.trim().is_empty() => {
            AuthContext::authenticated(UserIdentity::new(UserId::new(id.trim())))
        }
        _ => {
            tracing::warn!("No user id supplied; running unauthenticated");
            AuthContext::anonymous()
        }
    }
}

/// A parsed line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Show the command reference
    Help,
    /// List conversations
    List,
    /// Start a fresh conversation
    New,
    /// Open the n-th listed conversation (1-based)
    Open(usize),
    /// Rename the n-th listed conversation
    Rename(usize, String),
    /// Delete the n-th listed conversation
    Delete(usize),
    /// Leave the session
    Quit,
    /// Anything else: a message for the bot
    Send(String),
}

/// Parse one line of interactive input
///
/// Lines starting with `/` are commands; everything else is a message.
/// Returns a user-facing usage string when a command is malformed.
pub fn parse_repl_command(input: &str) -> std::result::Result<ReplCommand, String> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Ok(ReplCommand::Send(trimmed.to_string()));
    }

    let mut parts = trimmed.splitn(3, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    match command {
        "/help" => Ok(ReplCommand::Help),
        "/list" => Ok(ReplCommand::List),
        "/new" => Ok(ReplCommand::New),
        "/quit" | "/exit" => Ok(ReplCommand::Quit),
        "/open" => {
            let index = parse_index(parts.next()).ok_or("usage: /open <number>")?;
            Ok(ReplCommand::Open(index))
        }
        "/delete" => {
            let index = parse_index(parts.next()).ok_or("usage: /delete <number>")?;
            Ok(ReplCommand::Delete(index))
        }
        "/rename" => {
            let index = parse_index(parts.next()).ok_or("usage: /rename <number> <title>")?;
            let title = parts.next().map(str::trim).unwrap_or_default();
            if title.is_empty() {
                return Err("usage: /rename <number> <title>".to_string());
            }
            Ok(ReplCommand::Rename(index, title.to_string()))
        }
        other => Err(format!("Unknown command: {} (try /help)", other)),
    }
}

fn parse_index(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

// Interactive chat session handler
pub mod chat {
    //! Interactive chat session.
    //!
    //! Instantiates the GraphQL store and webhook responder, creates a
    //! `ChatSession`, and runs a readline loop that submits input to the
    //! session manager. The loop is thin presentation: every state change
    //! goes through a session operation.

    use super::*;
    use crate::config::Config;
    use crate::responder::WebhookResponder;
    use crate::session::{ChatSession, Conversation, SendStatus, Sender};
    use crate::store::GraphqlStore;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::sync::Arc;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `user_id` - Already-resolved user id, if any
    pub async fn run_chat(config: Config, user_id: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat session");

        let auth = resolve_auth(user_id);
        let store = Arc::new(GraphqlStore::new(&config.store)?);
        let responder = Arc::new(WebhookResponder::new(&config.responder)?);
        let session = ChatSession::new(store, responder, auth, &config.session);

        session.load_conversations().await;

        println!("{}", "chatling: type a message, or /help for commands".bold());
        let count = session.conversations().await.len();
        if count > 0 {
            println!("You have {} conversation(s); /list to browse them.\n", count);
        }

        let mut rl = DefaultEditor::new()?;

        loop {
            let prompt = prompt_line(&session).await;
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match parse_repl_command(trimmed) {
                        Ok(ReplCommand::Quit) => break,
                        Ok(command) => handle_command(&session, command).await,
                        Err(usage) => println!("{}", usage.yellow()),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        // Leaving the session mirrors a page unload: sweep abandoned empty
        // conversations, best effort.
        session.cleanup_empty_conversations(true).await;
        println!("Bye.");
        Ok(())
    }

    async fn prompt_line(session: &ChatSession) -> String {
        match session.active_conversation().await {
            Some(active) => format!("[{}] >> ", active.title),
            None => "[new] >> ".to_string(),
        }
    }

    async fn handle_command(session: &ChatSession, command: ReplCommand) {
        match command {
            ReplCommand::Help => print_help(),
            ReplCommand::List => print_conversations(&session.conversations().await),
            ReplCommand::New => {
                if session.create_conversation(None).await.is_none() {
                    println!("{}", "Could not start a conversation.".red());
                }
            }
            ReplCommand::Open(index) => match conversation_at(session, index).await {
                Some(id) => {
                    session.select_conversation(&id).await;
                    if let Some(active) = session.active_conversation().await {
                        print_history(&active);
                    }
                }
                None => println!("{}", "No such conversation.".yellow()),
            },
            ReplCommand::Rename(index, title) => match conversation_at(session, index).await {
                Some(id) => {
                    // Rename failures are surfaced directly; the user asked
                    // for this explicitly.
                    if let Err(e) = session.rename_conversation(&id, &title).await {
                        println!("{}", format!("Rename failed: {}", e).red());
                    }
                }
                None => println!("{}", "No such conversation.".yellow()),
            },
            ReplCommand::Delete(index) => match conversation_at(session, index).await {
                Some(id) => {
                    if let Err(e) = session.delete_conversation(&id).await {
                        println!("{}", format!("Delete failed: {}", e).red());
                    }
                }
                None => println!("{}", "No such conversation.".yellow()),
            },
            ReplCommand::Send(content) => {
                match session.send_message(&content).await {
                    SendStatus::Skipped => {
                        println!("{}", "Message not sent (are you signed in?).".yellow())
                    }
                    // Delivered and BotFailed both leave the reply (or an
                    // inline error bubble) in the conversation.
                    SendStatus::Delivered | SendStatus::BotFailed => {
                        if let Some(active) = session.active_conversation().await {
                            if let Some(last) = active.messages.last() {
                                if last.sender == Sender::Bot {
                                    println!("{}", last.content.green());
                                }
                            }
                        }
                    }
                }
            }
            ReplCommand::Quit => {}
        }
    }

    async fn conversation_at(session: &ChatSession, index: usize) -> Option<String> {
        session
            .conversations()
            .await
            .get(index - 1)
            .map(|c| c.id.clone())
    }

    fn print_conversations(conversations: &[Conversation]) {
        if conversations.is_empty() {
            println!("No conversations yet.");
            return;
        }
        for (i, conversation) in conversations.iter().enumerate() {
            println!(
                "{:>3}. {} {}",
                i + 1,
                conversation.title.cyan(),
                format!(
                    "({} message(s), {})",
                    conversation.message_count,
                    conversation.last_activity_at.format("%Y-%m-%d %H:%M")
                )
                .dimmed()
            );
        }
    }

    fn print_history(conversation: &Conversation) {
        println!("{}", format!("[{}]", conversation.title).bold());
        for message in &conversation.messages {
            match message.sender {
                Sender::User => println!("{} {}", ">".dimmed(), message.content),
                Sender::Bot => println!("{}", message.content.green()),
            }
        }
    }

    fn print_help() {
        println!("Commands:");
        println!("  /list                 list conversations");
        println!("  /open <n>             open the n-th conversation");
        println!("  /new                  start a fresh conversation");
        println!("  /rename <n> <title>   rename a conversation");
        println!("  /delete <n>           delete a conversation");
        println!("  /quit                 leave (empty conversations are cleaned up)");
        println!("Anything else is sent to the bot.");
    }
}

// Conversation listing handler
pub mod conversations {
    //! One-shot conversation listing.

    use super::*;
    use crate::config::Config;
    use crate::store::{ConversationStore, GraphqlStore};
    use colored::Colorize;

    /// List a user's conversations and exit
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `user_id` - Already-resolved user id, if any
    /// * `json` - Print raw records as JSON instead of a text listing
    pub async fn list_conversations(
        config: &Config,
        user_id: Option<String>,
        json: bool,
    ) -> Result<()> {
        let auth = resolve_auth(user_id);
        let Some(user_id) = auth.user_id() else {
            println!("{}", "A user id is required (--user-id).".yellow());
            return Ok(());
        };

        let store = GraphqlStore::new(&config.store)?;
        let records = store.list_conversations(user_id).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            println!("No conversations.");
            return Ok(());
        }
        for record in records {
            println!(
                "{}  {} {}",
                record.id.dimmed(),
                record.title.cyan(),
                format!("({} message(s))", record.message_count).dimmed()
            );
        }
        Ok(())
    }
}
