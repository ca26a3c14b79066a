//! Authentication context and user identity normalization
//!
//! Identity providers disagree about field names: some deliver the user id
//! as `id`, others as `user_id`. This module resolves that once, at the
//! boundary, into a single [`UserIdentity`] so the rest of the code never
//! inspects raw provider claims.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an authenticated user
///
/// Newtype over the provider-assigned id string. Stable for the lifetime of
/// a session and used verbatim in store queries and responder calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a user id from a raw string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized user identity resolved at the authentication boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    id: UserId,
}

impl UserIdentity {
    /// Create an identity from an already-known user id
    pub fn new(id: UserId) -> Self {
        Self { id }
    }

    /// Resolve an identity from raw provider claims
    ///
    /// Accepts either an `id` or a `user_id` field, in that order. Returns
    /// `None` when neither is present or the value is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatling::auth::UserIdentity;
    /// use serde_json::json;
    ///
    /// let identity = UserIdentity::from_claims(&json!({"user_id": "u-1"})).unwrap();
    /// assert_eq!(identity.user_id().as_str(), "u-1");
    /// assert!(UserIdentity::from_claims(&json!({"email": "a@b.c"})).is_none());
    /// ```
    pub fn from_claims(claims: &serde_json::Value) -> Option<Self> {
        let raw = claims
            .get("id")
            .and_then(|v| v.as_str())
            .or_else(|| claims.get("user_id").and_then(|v| v.as_str()))?;

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(Self {
            id: UserId::new(trimmed),
        })
    }

    /// The normalized user id
    pub fn user_id(&self) -> &UserId {
        &self.id
    }
}

/// Authentication state consumed by the session manager
///
/// Either an authenticated identity or anonymous. Session operations that
/// need an identity refuse as no-ops when anonymous; they never panic.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    identity: Option<UserIdentity>,
}

impl AuthContext {
    /// Build an authenticated context from a resolved identity
    pub fn authenticated(identity: UserIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Build an anonymous (unauthenticated) context
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    /// Whether a user identity has been resolved
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The authenticated user id, if any
    pub fn user_id(&self) -> Option<&UserId> {
        self.identity.as_ref().map(UserIdentity::user_id)
    }
}
