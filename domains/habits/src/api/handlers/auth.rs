//! Auth and session API handlers
//!
//! Implements:
//! - GET /api/auth/whoami: Authentication context for the current caller
//! - GET /api/auth/session: Validate the bearer JWT and describe the session
//! - POST /api/auth/session: Validate an access token supplied in the body
//! - POST /api/auth/refresh: Exchange a refresh token for a new session
//! - POST /api/auth/verify: Issue an API key to a JWT-authenticated user

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use habitrack_auth::{AuthContext, AuthError, AuthMethod, DualAuth, JwtAuth, JwtContext};
use habitrack_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::HabitsState;
use crate::domain::entities::{NewApiKey, DEFAULT_KEY_LABEL};
use crate::domain::validation::validate_not_blank;

// ============================================================
// DTOs
// ============================================================

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
}

/// Session metadata safe to return; the token itself is only previewed
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub expires_at: Option<DateTime<Utc>>,
    pub token_preview: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub session: SessionSummary,
    pub message: &'static str,
}

impl From<JwtContext> for SessionResponse {
    fn from(ctx: JwtContext) -> Self {
        Self {
            session: SessionSummary {
                expires_at: ctx.session.expires_at,
                token_preview: ctx.session.token_preview(),
            },
            user: UserResponse {
                id: ctx.user.id,
                email: ctx.user.email,
                email_verified: Some(ctx.email_verified),
            },
            message: "Session valid",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WhoamiApiKeyInfo {
    pub id: Uuid,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Response shape for `GET /api/auth/whoami`
#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    pub auth_method: AuthMethod,
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<WhoamiApiKeyInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionSummary>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SessionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "access_token is required"))]
    pub access_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<i64>,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct VerifyRequest {
    /// Label for the issued key; defaults to [`DEFAULT_KEY_LABEL`]
    #[validate(
        length(max = 50, message = "Label must be 50 characters or less"),
        custom(function = "validate_not_blank", message = "key_name cannot be empty")
    )]
    pub key_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub user: UserResponse,
    pub api_key: String,
}

// ============================================================
// Handlers
// ============================================================

/// GET /api/auth/whoami: Return authentication context for the current caller
pub async fn whoami(DualAuth(auth_context): DualAuth) -> Json<WhoamiResponse> {
    let auth_method = auth_context.method();

    let response = match auth_context {
        AuthContext::ApiKey(ctx) => WhoamiResponse {
            auth_method,
            user: UserResponse {
                id: ctx.user.id,
                email: ctx.user.email,
                email_verified: None,
            },
            api_key: Some(WhoamiApiKeyInfo {
                id: ctx.api_key.id,
                label: ctx.api_key.label,
                created_at: ctx.api_key.created_at,
                last_used_at: ctx.api_key.last_used_at,
            }),
            session: None,
        },
        AuthContext::Jwt(ctx) => {
            let SessionResponse { user, session, .. } = SessionResponse::from(ctx);
            WhoamiResponse {
                auth_method,
                user,
                api_key: None,
                session: Some(session),
            }
        }
    };

    Json(response)
}

/// GET /api/auth/session: Validate the bearer JWT
pub async fn get_session(JwtAuth(ctx): JwtAuth) -> Json<SessionResponse> {
    Json(SessionResponse::from(ctx))
}

/// POST /api/auth/session: Validate an access token from the request body
pub async fn create_session(
    State(state): State<HabitsState>,
    ValidatedJson(request): ValidatedJson<SessionRequest>,
) -> std::result::Result<Json<SessionResponse>, AuthError> {
    let ctx = state.auth.validate_jwt(&request.access_token).await?;

    Ok(Json(SessionResponse::from(ctx)))
}

/// POST /api/auth/refresh: Exchange a refresh token with the identity provider
pub async fn refresh_session(
    State(state): State<HabitsState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> std::result::Result<Json<RefreshResponse>, AuthError> {
    let session = state.auth.refresh_session(&request.refresh_token).await?;

    tracing::debug!(user_id = %session.user.id, "Session refreshed");

    Ok(Json(RefreshResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_at: session.expires_at,
        expires_in: session.expires_in,
        user: UserResponse {
            id: session.user.id,
            email: session.user.email.unwrap_or_default(),
            email_verified: Some(session.user.email_confirmed_at.is_some()),
        },
    }))
}

/// POST /api/auth/verify: Trade a verified session for a long-lived API key
pub async fn verify(
    JwtAuth(ctx): JwtAuth,
    State(state): State<HabitsState>,
    ValidatedJson(request): ValidatedJson<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    let label = request
        .key_name
        .as_deref()
        .map(str::trim)
        .unwrap_or(DEFAULT_KEY_LABEL);

    let new_key = NewApiKey::generate(label)?;
    let created = state.repos.api_keys.create(&ctx.scope, &new_key).await?;

    tracing::info!(user_id = %ctx.user.id, api_key_id = %created.id, "API key issued from session");

    Ok(Json(VerifyResponse {
        user: UserResponse {
            id: ctx.user.id,
            email: ctx.user.email,
            email_verified: None,
        },
        api_key: new_key.into_secret(),
    }))
}
