//! Auth read-model types
//!
//! Lightweight views of the `users` and `api_keys` rows carrying only what
//! authentication and handlers need. The key digest never leaves the store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Identity exposed uniformly by both auth paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub email: String,
}

/// Authenticated API key, excluding the sensitive `key_hash` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthApiKey {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Session metadata for JWT-authenticated requests.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionInfo {
    /// Leading characters of the access token, safe to echo back to clients.
    pub fn token_preview(&self) -> String {
        let preview: String = self.access_token.chars().take(20).collect();
        format!("{}...", preview)
    }
}

impl std::fmt::Debug for SessionInfo {
    #[mutants::skip] // Formatting only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionInfo")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
