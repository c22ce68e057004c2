//! Domain entities for the Habitrack habits domain
//!
//! Row shapes for boards, check-ins and API keys, plus the input types the
//! repositories accept. Every input is owner-less: the owning user always
//! comes from the request's `DbScope`, never from client input.

use chrono::{DateTime, NaiveDate, Utc};
use habitrack_common::{generate_api_key, hash_api_key, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Color assigned to boards created without one.
pub const DEFAULT_BOARD_COLOR: &str = "#22c55e";

/// Label for keys issued by the magic-link verification flow.
pub const DEFAULT_KEY_LABEL: &str = "Magic Link Authentication";

/// A habit board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Board {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Fields for a new board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBoard {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
}

/// Partial board update. `None` leaves a column untouched; `Some(None)`
/// clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
    pub archived: Option<bool>,
}

/// A daily check-in on a board; at most one per board and date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CheckIn {
    pub id: Uuid,
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckIn {
    pub board_id: Uuid,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInChanges {
    pub completed: Option<bool>,
    pub notes: Option<Option<String>>,
}

/// Filters for listing check-ins; bounds are inclusive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInFilter {
    pub board_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// API key as shown to its owner. The digest is never selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}

/// A freshly generated key: the digest to persist and the secret to hand
/// back exactly once.
#[derive(Clone)]
pub struct NewApiKey {
    pub id: Uuid,
    pub label: String,
    pub key_hash: String,
    secret: String,
}

impl NewApiKey {
    pub fn generate(label: impl Into<String>) -> Result<Self> {
        let secret = generate_api_key()?;

        Ok(Self {
            id: Uuid::new_v4(),
            label: label.into(),
            key_hash: hash_api_key(&secret),
            secret,
        })
    }

    /// Consume the key, yielding the cleartext secret.
    pub fn into_secret(self) -> String {
        self.secret
    }
}

impl std::fmt::Debug for NewApiKey {
    #[mutants::skip] // Formatting only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewApiKey")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("key_hash", &self.key_hash)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
