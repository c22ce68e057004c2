//! Identity-scoped database access
//!
//! Every resolved context carries a `DbScope`. Repositories take the scope
//! instead of a bare user id and always filter on [`DbScope::owner_id`].
//! JWT requests additionally run under the `authenticated` role with the
//! verified claims installed, so Postgres row-level security applies too.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Clone, PartialEq)]
pub enum DbScope {
    /// API-key request: application-level ownership filter only.
    Owner { user_id: Uuid },
    /// JWT request: ownership filter plus row-level security.
    RowLevel {
        user_id: Uuid,
        claims: serde_json::Value,
    },
}

impl DbScope {
    /// The user every query through this scope is restricted to.
    pub fn owner_id(&self) -> Uuid {
        match self {
            DbScope::Owner { user_id } | DbScope::RowLevel { user_id, .. } => *user_id,
        }
    }

    pub fn is_row_level(&self) -> bool {
        matches!(self, DbScope::RowLevel { .. })
    }

    /// Open a transaction bound to this scope.
    ///
    /// For `RowLevel` the role and claims are set transaction-locally, so they
    /// are discarded on commit or rollback and never leak to pooled connections.
    pub async fn begin(&self, pool: &PgPool) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let DbScope::RowLevel { claims, .. } = self {
            sqlx::query("SELECT set_config('role', 'authenticated', true)")
                .execute(&mut *tx)
                .await?;

            sqlx::query("SELECT set_config('request.jwt.claims', $1, true)")
                .bind(claims.to_string())
                .execute(&mut *tx)
                .await?;
        }

        Ok(tx)
    }
}

impl std::fmt::Debug for DbScope {
    #[mutants::skip] // Formatting only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbScope::Owner { user_id } => f.debug_struct("Owner").field("user_id", user_id).finish(),
            DbScope::RowLevel { user_id, .. } => f
                .debug_struct("RowLevel")
                .field("user_id", user_id)
                .field("claims", &"[REDACTED]")
                .finish(),
        }
    }
}
