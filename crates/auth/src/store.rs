//! Auth data store
//!
//! The four single-row operations the validators need, behind a trait so the
//! resolution logic can run against Postgres in production and an in-memory
//! fake in tests. The Postgres implementation uses runtime `sqlx::query_as`
//! (not macros) and connects with the service role, so it is not subject to
//! row-level security.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::{AuthApiKey, AuthIdentity};

/// Primary key constraint on `users.id`; a violation means the row already exists.
const USERS_PKEY: &str = "users_pkey";

/// Store failures the validators distinguish.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The row being inserted already exists (lost a provisioning race).
    #[error("record already exists")]
    Conflict,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Non-revoked API key joined with its owner's email.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ApiKeyRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub user_email: Option<String>,
}

impl From<ApiKeyRecord> for AuthApiKey {
    fn from(record: ApiKeyRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            label: record.label,
            created_at: record.created_at,
            last_used_at: record.last_used_at,
            revoked_at: record.revoked_at,
        }
    }
}

#[async_trait]
pub trait AuthStore: Send + Sync + 'static {
    /// Find the non-revoked key whose stored digest equals `key_hash`.
    async fn find_active_api_key(&self, key_hash: &str)
        -> Result<Option<ApiKeyRecord>, StoreError>;

    /// Record the current time as the key's `last_used_at`.
    async fn touch_api_key(&self, id: Uuid) -> Result<(), StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, StoreError>;

    /// Insert a user row. Returns [`StoreError::Conflict`] when `id` already exists.
    async fn insert_user(&self, id: Uuid, email: &str) -> Result<(), StoreError>;
}

/// Postgres-backed auth store.
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn find_active_api_key(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyRecord>, StoreError> {
        let record: Option<ApiKeyRecord> = sqlx::query_as(
            r#"
            SELECT k.id, k.user_id, k.label, k.created_at,
                   k.last_used_at, k.revoked_at, u.email AS user_email
            FROM api_keys k
            LEFT JOIN users u ON u.id = k.user_id
            WHERE k.key_hash = $1 AND k.revoked_at IS NULL
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn touch_api_key(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, StoreError> {
        let row: Option<(Uuid, String)> = sqlx::query_as("SELECT id, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id, email)| AuthIdentity { id, email }))
    }

    async fn insert_user(&self, id: Uuid, email: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let duplicate_id = habitrack_common::is_unique_violation(&e)
                && matches!(&e, sqlx::Error::Database(db_err) if db_err.constraint() == Some(USERS_PKEY));
            if duplicate_id {
                StoreError::Conflict
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(())
    }
}
