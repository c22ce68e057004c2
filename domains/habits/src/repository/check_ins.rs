//! Check-in repository

use habitrack_auth::DbScope;
use habitrack_common::{is_unique_violation, Error, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{CheckIn, CheckInChanges, CheckInFilter, NewCheckIn};

const CHECK_IN_COLUMNS: &str =
    "id, board_id, user_id, date, completed, notes, created_at, updated_at";

#[derive(Clone)]
pub struct CheckInRepository {
    pool: PgPool,
}

impl CheckInRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the caller's check-ins, most recent date first
    pub async fn list(&self, scope: &DbScope, filter: &CheckInFilter) -> Result<Vec<CheckIn>> {
        let mut tx = scope.begin(&self.pool).await?;

        let check_ins: Vec<CheckIn> = sqlx::query_as(&format!(
            r#"
            SELECT {CHECK_IN_COLUMNS}
            FROM check_ins
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR board_id = $2)
              AND ($3::date IS NULL OR date >= $3)
              AND ($4::date IS NULL OR date <= $4)
            ORDER BY date DESC
            "#
        ))
        .bind(scope.owner_id())
        .bind(filter.board_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(check_ins)
    }

    /// Record a check-in on one of the caller's boards.
    ///
    /// `Ok(None)` when the board does not exist or belongs to someone else.
    pub async fn create(&self, scope: &DbScope, check_in: &NewCheckIn) -> Result<Option<CheckIn>> {
        let mut tx = scope.begin(&self.pool).await?;

        let created: Option<CheckIn> = sqlx::query_as(&format!(
            r#"
            INSERT INTO check_ins (id, board_id, user_id, date, completed, notes, created_at, updated_at)
            SELECT $1, b.id, b.user_id, $4, $5, $6, NOW(), NOW()
            FROM boards b
            WHERE b.id = $2 AND b.user_id = $3
            RETURNING {CHECK_IN_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(check_in.board_id)
        .bind(scope.owner_id())
        .bind(check_in.date)
        .bind(check_in.completed)
        .bind(&check_in.notes)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict("A check-in already exists for this board and date".to_string())
            } else {
                Error::Database(e)
            }
        })?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        scope: &DbScope,
        id: Uuid,
        changes: &CheckInChanges,
    ) -> Result<Option<CheckIn>> {
        let mut tx = scope.begin(&self.pool).await?;

        let updated: Option<CheckIn> = sqlx::query_as(&format!(
            r#"
            UPDATE check_ins SET
                completed = COALESCE($3, completed),
                notes = CASE WHEN $4 THEN $5 ELSE notes END,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CHECK_IN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(scope.owner_id())
        .bind(changes.completed)
        .bind(changes.notes.is_some())
        .bind(changes.notes.clone().flatten())
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }
}
