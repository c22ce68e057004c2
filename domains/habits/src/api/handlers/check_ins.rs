//! Check-in handlers
//!
//! - GET /api/check-ins: List check-ins, filterable by board and date range
//! - POST /api/check-ins: Record a check-in
//! - PATCH /api/check-ins/{id}: Update completion or notes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use habitrack_auth::DualAuth;
use habitrack_common::{Error, Result, ValidatedJson, ValidatedQuery};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::double_option;
use crate::api::middleware::HabitsState;
use crate::domain::entities::{CheckIn, CheckInChanges, CheckInFilter, NewCheckIn};
use crate::domain::validation::{parse_date, validate_check_in_date, validate_date};

#[derive(Debug, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct CheckInListQuery {
    pub board_id: Option<Uuid>,

    #[validate(custom(function = "validate_date"))]
    pub date_from: Option<String>,

    #[validate(custom(function = "validate_date"))]
    pub date_to: Option<String>,
}

fn validate_date_range(query: &CheckInListQuery) -> std::result::Result<(), ValidationError> {
    let from = query.date_from.as_deref().and_then(parse_date);
    let to = query.date_to.as_deref().and_then(parse_date);

    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(ValidationError::new("date_range")
            .with_message("date_from must be before or equal to date_to".into())),
        _ => Ok(()),
    }
}

impl CheckInListQuery {
    fn into_filter(self) -> CheckInFilter {
        CheckInFilter {
            board_id: self.board_id,
            date_from: self.date_from.as_deref().and_then(parse_date),
            date_to: self.date_to.as_deref().and_then(parse_date),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCheckInRequest {
    pub board_id: Uuid,

    /// `YYYY-MM-DD`, no later than tomorrow
    #[validate(custom(function = "validate_check_in_date"))]
    pub date: String,

    pub completed: bool,

    #[validate(length(max = 1000, message = "Notes must be 1000 characters or less"))]
    pub notes: Option<String>,
}

impl CreateCheckInRequest {
    fn into_new_check_in(self) -> Result<NewCheckIn> {
        let date = parse_date(&self.date)
            .ok_or_else(|| Error::BadRequest("Invalid date format (YYYY-MM-DD)".to_string()))?;

        Ok(NewCheckIn {
            board_id: self.board_id,
            date,
            completed: self.completed,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCheckInRequest {
    pub completed: Option<bool>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 1000, message = "Notes must be 1000 characters or less"))]
    pub notes: Option<Option<String>>,
}

impl From<UpdateCheckInRequest> for CheckInChanges {
    fn from(request: UpdateCheckInRequest) -> Self {
        Self {
            completed: request.completed,
            notes: request.notes,
        }
    }
}

/// GET /api/check-ins
pub async fn list_check_ins(
    DualAuth(auth): DualAuth,
    State(state): State<HabitsState>,
    ValidatedQuery(query): ValidatedQuery<CheckInListQuery>,
) -> Result<Json<Vec<CheckIn>>> {
    let check_ins = state
        .repos
        .check_ins
        .list(auth.scope(), &query.into_filter())
        .await?;

    Ok(Json(check_ins))
}

/// POST /api/check-ins: The board must belong to the caller
pub async fn create_check_in(
    DualAuth(auth): DualAuth,
    State(state): State<HabitsState>,
    ValidatedJson(request): ValidatedJson<CreateCheckInRequest>,
) -> Result<(StatusCode, Json<CheckIn>)> {
    let new_check_in = request.into_new_check_in()?;

    let check_in = state
        .repos
        .check_ins
        .create(auth.scope(), &new_check_in)
        .await?
        .ok_or_else(|| Error::NotFound("Board not found".to_string()))?;

    tracing::info!(
        user_id = %auth.user_id(),
        board_id = %check_in.board_id,
        date = %check_in.date,
        "Check-in recorded"
    );

    Ok((StatusCode::CREATED, Json(check_in)))
}

/// PATCH /api/check-ins/{id}
pub async fn update_check_in(
    DualAuth(auth): DualAuth,
    State(state): State<HabitsState>,
    Path(check_in_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateCheckInRequest>,
) -> Result<Json<CheckIn>> {
    let check_in = state
        .repos
        .check_ins
        .update(auth.scope(), check_in_id, &request.into())
        .await?
        .ok_or_else(|| Error::NotFound("Check-in not found".to_string()))?;

    Ok(Json(check_in))
}
