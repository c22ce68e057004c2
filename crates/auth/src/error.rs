//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Authentication error
///
/// Every variant maps to a fixed status and a short client-facing message.
/// `Internal` carries a detail string for the server log only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Invalid authorization format")]
    InvalidAuthFormat,
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("API key has been revoked")]
    ApiKeyRevoked,
    #[error("Invalid JWT token format")]
    InvalidTokenFormat,
    #[error("Invalid or expired JWT token")]
    InvalidOrExpiredToken,
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,
    #[error("Failed to create user account")]
    UserProvisioningFailed,
    #[error("Internal server error")]
    Internal(String),
}

impl AuthError {
    /// Build an internal fault from any displayable cause.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        AuthError::Internal(detail.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UserProvisioningFailed | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AuthError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Authentication error");
        }

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}
