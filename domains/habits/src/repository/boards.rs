//! Board repository

use habitrack_auth::DbScope;
use habitrack_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Board, BoardChanges, NewBoard};

const BOARD_COLUMNS: &str =
    "id, user_id, name, description, color, icon, created_at, updated_at, archived_at";

#[derive(Clone)]
pub struct BoardRepository {
    pool: PgPool,
}

impl BoardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the caller's boards, newest first
    pub async fn list(&self, scope: &DbScope, include_archived: bool) -> Result<Vec<Board>> {
        let mut tx = scope.begin(&self.pool).await?;

        let boards: Vec<Board> = sqlx::query_as(&format!(
            r#"
            SELECT {BOARD_COLUMNS}
            FROM boards
            WHERE user_id = $1 AND ($2 OR archived_at IS NULL)
            ORDER BY created_at DESC
            "#
        ))
        .bind(scope.owner_id())
        .bind(include_archived)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(boards)
    }

    pub async fn create(&self, scope: &DbScope, board: &NewBoard) -> Result<Board> {
        let mut tx = scope.begin(&self.pool).await?;

        let created: Board = sqlx::query_as(&format!(
            r#"
            INSERT INTO boards (id, user_id, name, description, color, icon, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {BOARD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(scope.owner_id())
        .bind(&board.name)
        .bind(&board.description)
        .bind(&board.color)
        .bind(&board.icon)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Apply `changes` to one of the caller's boards. `None` if no such board.
    pub async fn update(
        &self,
        scope: &DbScope,
        id: Uuid,
        changes: &BoardChanges,
    ) -> Result<Option<Board>> {
        let mut tx = scope.begin(&self.pool).await?;

        let updated: Option<Board> = sqlx::query_as(&format!(
            r#"
            UPDATE boards SET
                name = COALESCE($3, name),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                color = COALESCE($6, color),
                icon = CASE WHEN $7 THEN $8 ELSE icon END,
                archived_at = CASE
                    WHEN $9::boolean IS NULL THEN archived_at
                    WHEN $9 THEN COALESCE(archived_at, NOW())
                    ELSE NULL
                END,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {BOARD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(scope.owner_id())
        .bind(&changes.name)
        .bind(changes.description.is_some())
        .bind(changes.description.clone().flatten())
        .bind(&changes.color)
        .bind(changes.icon.is_some())
        .bind(changes.icon.clone().flatten())
        .bind(changes.archived)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }
}
