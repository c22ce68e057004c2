//! Identity provider client
//!
//! Token verification and refresh are delegated to Supabase Auth (GoTrue).
//! This crate never checks JWT signatures itself; the provider's answer is
//! ground truth.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;

/// User as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

/// Session returned by a refresh-token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub expires_in: i64,
    pub user: ProviderUser,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered and refused the credential.
    #[error("identity provider rejected credential ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The provider could not be reached or answered with garbage.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Verify an access token and return the user it belongs to.
    async fn verify(&self, access_token: &str) -> Result<ProviderUser, ProviderError>;

    /// Exchange an opaque refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError>;
}

/// GoTrue error body; field names vary across versions.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default, alias = "error_description", alias = "message")]
    msg: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Supabase Auth implementation over reqwest.
pub struct SupabaseIdentityProvider {
    client: Client,
    config: AuthConfig,
}

impl SupabaseIdentityProvider {
    pub fn new(config: AuthConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.supabase_url, path)
    }
}

/// Turn a non-success response into a `ProviderError`.
async fn rejection(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());

    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|e| e.msg)
        .unwrap_or(body);

    classify_failure(status, message)
}

/// Only a refusal of the credential itself is a rejection. Throttling and
/// server faults say nothing about the token.
fn classify_failure(status: StatusCode, message: String) -> ProviderError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        ProviderError::Unavailable(format!("{}: {}", status, message))
    } else {
        ProviderError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    async fn verify(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        tracing::debug!("Verifying access token with identity provider");

        let response = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.config.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        response
            .json::<ProviderUser>()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Failed to parse user: {}", e)))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        tracing::debug!("Exchanging refresh token with identity provider");

        let response = self
            .client
            .post(self.url("token?grant_type=refresh_token"))
            .header("apikey", &self.config.api_key)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        response
            .json::<ProviderSession>()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Failed to parse session: {}", e)))
    }
}
