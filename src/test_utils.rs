//! Test utilities for Chatling
//!
//! This module provides common test utilities including temporary directory
//! management, test configuration, and record builders.

use crate::config::Config;
use crate::store::ConversationRecord;
use chrono::Utc;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Arguments
///
/// * `dir` - Directory to create the file in
/// * `name` - Name of the file
/// * `content` - Content to write to the file
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Create a test configuration with default values
pub fn test_config() -> Config {
    Config::default()
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
store:
  endpoint: https://example.graphql.host/v1
  admin_secret: test-secret
  delete_timeout_seconds: 5

responder:
  webhook_url: https://bots.example.com/webhook/send-message
  auth_token: test-token
  timeout_seconds: 30

session:
  cleanup_delay_ms: 10
"#
    .to_string()
}

/// Build a conversation record for tests
pub fn conversation_record(id: &str, title: &str, message_count: u64) -> ConversationRecord {
    ConversationRecord {
        id: id.to_string(),
        title: title.to_string(),
        user_id: "u-test".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        message_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_test_config() {
        let config = test_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml() {
        let yaml = test_config_yaml();
        assert!(yaml.contains("store:"));
        assert!(yaml.contains("responder:"));
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.cleanup_delay_ms, 10);
    }

    #[test]
    fn test_conversation_record_builder() {
        let record = conversation_record("c-1", "Title", 3);
        assert_eq!(record.id, "c-1");
        assert_eq!(record.message_count, 3);
    }
}
