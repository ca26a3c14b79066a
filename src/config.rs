//! Configuration management for Chatling
//!
//! This module handles loading, parsing, and validating configuration for
//! the conversation store endpoint, the response generator webhook, and
//! session behavior.

use crate::error::{ChatlingError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for Chatling
///
/// Holds everything needed to reach the two remote collaborators and to tune
/// session behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Conversation store (GraphQL) settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Response generator (webhook) settings
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Session manager behavior
    #[serde(default)]
    pub session: SessionConfig,
}

/// Conversation store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// GraphQL endpoint URL
    #[serde(default = "default_store_endpoint")]
    pub endpoint: String,

    /// Admin secret sent with every request
    #[serde(default)]
    pub admin_secret: String,

    /// Bounded timeout for delete operations (seconds)
    ///
    /// Deletes triggered from cleanup sweeps must not hang past page-unload
    /// style deadlines, so they get a short per-request timeout.
    #[serde(default = "default_delete_timeout")]
    pub delete_timeout_seconds: u64,
}

fn default_store_endpoint() -> String {
    "http://localhost:8080/v1/graphql".to_string()
}

fn default_delete_timeout() -> u64 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_store_endpoint(),
            admin_secret: String::new(),
            delete_timeout_seconds: default_delete_timeout(),
        }
    }
}

/// Response generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Webhook URL that produces bot replies
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,

    /// Bearer token sent with every webhook call
    #[serde(default)]
    pub auth_token: String,

    /// Overall request timeout (seconds)
    ///
    /// The generator may be slow; this bounds how long a send waits before
    /// the failure is surfaced as an inline bot message.
    #[serde(default = "default_responder_timeout")]
    pub timeout_seconds: u64,
}

fn default_webhook_url() -> String {
    "http://localhost:5678/webhook/send-message".to_string()
}

fn default_responder_timeout() -> u64 {
    120
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            webhook_url: default_webhook_url(),
            auth_token: String::new(),
            timeout_seconds: default_responder_timeout(),
        }
    }
}

/// Session manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Delay before the cleanup sweep that runs after switching
    /// conversations (milliseconds)
    ///
    /// Keeps the sweep off the interaction critical path so a conversation
    /// switch never feels slow.
    #[serde(default = "default_cleanup_delay")]
    pub cleanup_delay_ms: u64,
}

fn default_cleanup_delay() -> u64 {
    100
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cleanup_delay_ms: default_cleanup_delay(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// A missing file is not an error: defaults are used so the CLI can run
    /// against local development services without any setup.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ChatlingError::Config` when an endpoint URL does not parse
    /// or a timeout is zero.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.store.endpoint).map_err(|e| {
            ChatlingError::Config(format!(
                "invalid store endpoint '{}': {}",
                self.store.endpoint, e
            ))
        })?;

        Url::parse(&self.responder.webhook_url).map_err(|e| {
            ChatlingError::Config(format!(
                "invalid responder webhook URL '{}': {}",
                self.responder.webhook_url, e
            ))
        })?;

        if self.store.delete_timeout_seconds == 0 {
            return Err(
                ChatlingError::Config("store.delete_timeout_seconds must be > 0".to_string())
                    .into(),
            );
        }

        if self.responder.timeout_seconds == 0 {
            return Err(
                ChatlingError::Config("responder.timeout_seconds must be > 0".to_string()).into(),
            );
        }

        Ok(())
    }
}

/// Default configuration file path for this platform
///
/// Resolves to the per-user config directory (e.g.
/// `~/.config/chatling/config.yaml` on Linux). Falls back to a relative
/// path when the platform directories cannot be determined.
pub fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "chatling")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("config.yaml"))
}
