//! API key repository
//!
//! Management side of the `api_keys` table: listing, issuing and revoking
//! the caller's own keys. Lookup by digest for authentication lives in the
//! auth crate's store.

use habitrack_auth::DbScope;
use habitrack_common::{is_unique_violation, Error, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{ApiKey, NewApiKey};

const API_KEY_COLUMNS: &str = "id, user_id, label, created_at, last_used_at, revoked_at";

#[derive(Clone)]
pub struct ApiKeyRepository {
    pool: PgPool,
}

impl ApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all of the caller's keys, revoked included, newest first
    pub async fn list(&self, scope: &DbScope) -> Result<Vec<ApiKey>> {
        let mut tx = scope.begin(&self.pool).await?;

        let keys: Vec<ApiKey> = sqlx::query_as(&format!(
            r#"
            SELECT {API_KEY_COLUMNS}
            FROM api_keys
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(scope.owner_id())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(keys)
    }

    /// True if the caller has a non-revoked key with this label
    pub async fn label_in_use(&self, scope: &DbScope, label: &str) -> Result<bool> {
        let mut tx = scope.begin(&self.pool).await?;

        let in_use: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM api_keys
                WHERE user_id = $1 AND label = $2 AND revoked_at IS NULL
            )
            "#,
        )
        .bind(scope.owner_id())
        .bind(label)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(in_use)
    }

    /// Persist a generated key for the caller.
    ///
    /// A duplicate digest means the generator produced a colliding secret;
    /// that is a server fault, not a client error.
    pub async fn create(&self, scope: &DbScope, key: &NewApiKey) -> Result<ApiKey> {
        let mut tx = scope.begin(&self.pool).await?;

        let created: ApiKey = sqlx::query_as(&format!(
            r#"
            INSERT INTO api_keys (id, user_id, key_hash, label, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING {API_KEY_COLUMNS}
            "#
        ))
        .bind(key.id)
        .bind(scope.owner_id())
        .bind(&key.key_hash)
        .bind(&key.label)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                tracing::error!(api_key_id = %key.id, "Generated API key collides with an existing digest");
                Error::Internal("API key digest collision".to_string())
            } else {
                Error::Database(e)
            }
        })?;

        tx.commit().await?;
        Ok(created)
    }

    /// Revoke one of the caller's active keys. Revocation is one-way.
    ///
    /// Returns `false` if the key does not exist, is not the caller's, or is
    /// already revoked.
    pub async fn revoke(&self, scope: &DbScope, id: Uuid) -> Result<bool> {
        let mut tx = scope.begin(&self.pool).await?;

        let result = sqlx::query(
            r#"
            UPDATE api_keys SET revoked_at = NOW()
            WHERE id = $1 AND user_id = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(scope.owner_id())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }
}
