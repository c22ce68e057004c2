//! Board handlers
//!
//! - GET /api/boards: List the caller's boards
//! - POST /api/boards: Create a board
//! - PATCH /api/boards/{id}: Update or archive a board

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use habitrack_auth::DualAuth;
use habitrack_common::{Error, Result, ValidatedJson, ValidatedQuery};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::double_option;
use crate::api::middleware::HabitsState;
use crate::domain::entities::{Board, BoardChanges, NewBoard, DEFAULT_BOARD_COLOR};
use crate::domain::validation::{validate_hex_color, validate_not_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct BoardListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(
        length(max = 100, message = "Name must be 100 characters or less"),
        custom(function = "validate_not_blank", message = "Name is required")
    )]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be 500 characters or less"))]
    pub description: Option<String>,

    /// Defaults to [`DEFAULT_BOARD_COLOR`]
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,

    pub icon: Option<String>,
}

impl CreateBoardRequest {
    fn into_new_board(self) -> NewBoard {
        NewBoard {
            name: self.name.trim().to_string(),
            description: self.description,
            color: self
                .color
                .unwrap_or_else(|| DEFAULT_BOARD_COLOR.to_string()),
            icon: self.icon,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    #[validate(
        length(max = 100, message = "Name must be 100 characters or less"),
        custom(function = "validate_not_blank", message = "Name cannot be empty")
    )]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500, message = "Description must be 500 characters or less"))]
    pub description: Option<Option<String>>,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub icon: Option<Option<String>>,

    /// `true` archives the board, `false` restores it
    pub archived: Option<bool>,
}

impl From<UpdateBoardRequest> for BoardChanges {
    fn from(request: UpdateBoardRequest) -> Self {
        Self {
            name: request.name.map(|name| name.trim().to_string()),
            description: request.description,
            color: request.color,
            icon: request.icon,
            archived: request.archived,
        }
    }
}

/// GET /api/boards: Archived boards are hidden unless `include_archived=true`
pub async fn list_boards(
    DualAuth(auth): DualAuth,
    State(state): State<HabitsState>,
    ValidatedQuery(query): ValidatedQuery<BoardListQuery>,
) -> Result<Json<Vec<Board>>> {
    let boards = state
        .repos
        .boards
        .list(auth.scope(), query.include_archived)
        .await?;

    Ok(Json(boards))
}

/// POST /api/boards
pub async fn create_board(
    DualAuth(auth): DualAuth,
    State(state): State<HabitsState>,
    ValidatedJson(request): ValidatedJson<CreateBoardRequest>,
) -> Result<(StatusCode, Json<Board>)> {
    let board = state
        .repos
        .boards
        .create(auth.scope(), &request.into_new_board())
        .await?;

    tracing::info!(user_id = %auth.user_id(), board_id = %board.id, "Board created");

    Ok((StatusCode::CREATED, Json(board)))
}

/// PATCH /api/boards/{id}
pub async fn update_board(
    DualAuth(auth): DualAuth,
    State(state): State<HabitsState>,
    Path(board_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateBoardRequest>,
) -> Result<Json<Board>> {
    let board = state
        .repos
        .boards
        .update(auth.scope(), board_id, &request.into())
        .await?
        .ok_or_else(|| Error::NotFound("Board not found".to_string()))?;

    Ok(Json(board))
}
