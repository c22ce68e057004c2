//! API Key management handlers
//!
//! Implements API key CRUD operations:
//! - GET /api/api-keys: List the caller's API keys
//! - POST /api/api-keys: Create a new API key
//! - DELETE /api/api-keys/{id}: Revoke an API key

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use habitrack_auth::DualAuth;
use habitrack_common::{Error, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::HabitsState;
use crate::domain::entities::{ApiKey, NewApiKey};
use crate::domain::validation::validate_not_blank;

// ============================================================
// DTOs
// ============================================================

/// API key response: never exposes `key_hash`
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            label: key.label,
            created_at: key.created_at,
            last_used_at: key.last_used_at,
            revoked_at: key.revoked_at,
        }
    }
}

/// Response for API key creation: includes the raw key (only visible once)
#[derive(Debug, Serialize)]
pub struct CreateApiKeyResponse {
    pub id: Uuid,
    pub label: String,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateApiKeyRequest {
    #[validate(
        length(max = 50, message = "Label must be 50 characters or less"),
        custom(function = "validate_not_blank", message = "Label is required")
    )]
    pub label: String,
}

// ============================================================
// Handlers
// ============================================================

/// GET /api/api-keys: All of the caller's keys, newest first
pub async fn list_api_keys(
    DualAuth(auth): DualAuth,
    State(state): State<HabitsState>,
) -> Result<Json<Vec<ApiKeyResponse>>> {
    let keys = state.repos.api_keys.list(auth.scope()).await?;

    Ok(Json(keys.into_iter().map(ApiKeyResponse::from).collect()))
}

/// POST /api/api-keys: Labels are unique among the caller's active keys
pub async fn create_api_key(
    DualAuth(auth): DualAuth,
    State(state): State<HabitsState>,
    ValidatedJson(request): ValidatedJson<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<CreateApiKeyResponse>)> {
    let label = request.label.trim();

    if state
        .repos
        .api_keys
        .label_in_use(auth.scope(), label)
        .await?
    {
        return Err(Error::Conflict(
            "An API key with this label already exists".to_string(),
        ));
    }

    let new_key = NewApiKey::generate(label)?;
    let created = state.repos.api_keys.create(auth.scope(), &new_key).await?;

    tracing::info!(user_id = %auth.user_id(), api_key_id = %created.id, "API key created");

    Ok((
        StatusCode::CREATED,
        Json(CreateApiKeyResponse {
            id: created.id,
            label: created.label,
            api_key: new_key.into_secret(),
            created_at: created.created_at,
        }),
    ))
}

/// DELETE /api/api-keys/{id}: Revoke an API key
pub async fn revoke_api_key(
    DualAuth(auth): DualAuth,
    State(state): State<HabitsState>,
    Path(key_id): Path<Uuid>,
) -> Result<StatusCode> {
    // Unknown, foreign and already-revoked keys are indistinguishable (404)
    let revoked = state.repos.api_keys.revoke(auth.scope(), key_id).await?;

    if !revoked {
        return Err(Error::NotFound("API key not found".to_string()));
    }

    tracing::info!(user_id = %auth.user_id(), api_key_id = %key_id, "API key revoked");

    Ok(StatusCode::NO_CONTENT)
}
