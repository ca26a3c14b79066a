//! Error types for Chatling
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Chatling operations
///
/// This enum encompasses all possible errors that can occur while talking to
/// the conversation store, the response generator, or while loading and
/// validating configuration.
#[derive(Error, Debug)]
pub enum ChatlingError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Conversation store errors (GraphQL mutations and queries)
    #[error("Store error: {0}")]
    Store(String),

    /// Response generator errors (webhook calls, malformed replies)
    #[error("Responder error: {0}")]
    Responder(String),

    /// Authentication errors (missing or unusable user identity)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Session state errors
    #[error("Session error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Chatling operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ChatlingError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_store_error_display() {
        let error = ChatlingError::Store("mutation rejected".to_string());
        assert_eq!(error.to_string(), "Store error: mutation rejected");
    }

    #[test]
    fn test_responder_error_display() {
        let error = ChatlingError::Responder("webhook timed out".to_string());
        assert_eq!(error.to_string(), "Responder error: webhook timed out");
    }

    #[test]
    fn test_auth_error_display() {
        let error = ChatlingError::Auth("no user identity".to_string());
        assert_eq!(error.to_string(), "Authentication error: no user identity");
    }

    #[test]
    fn test_session_error_display() {
        let error = ChatlingError::Session("unknown conversation".to_string());
        assert_eq!(error.to_string(), "Session error: unknown conversation");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ChatlingError = io_error.into();
        assert!(matches!(error, ChatlingError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: ChatlingError = json_error.into();
        assert!(matches!(error, ChatlingError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: ChatlingError = yaml_error.into();
        assert!(matches!(error, ChatlingError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatlingError>();
    }
}
