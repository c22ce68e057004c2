//! Authentication backend
//!
//! Owns both validators and dispatches each request to exactly one of them
//! based on the credential classification. There is no fallback between the
//! two paths.
//!
//! Domain states expose this via `FromRef`:
//! ```ignore
//! impl FromRef<MyDomainState> for AuthBackend {
//!     fn from_ref(state: &MyDomainState) -> Self {
//!         state.auth.clone()
//!     }
//! }
//! ```

use std::sync::Arc;

use axum::http::HeaderValue;
use sqlx::PgPool;

use crate::api_key::ApiKeyValidator;
use crate::classifier::{classify, Credential};
use crate::config::AuthConfig;
use crate::context::{AuthContext, JwtContext};
use crate::error::AuthError;
use crate::jwt::JwtValidator;
use crate::provider::{IdentityProvider, ProviderError, ProviderSession, SupabaseIdentityProvider};
use crate::store::{AuthStore, PgAuthStore};

#[derive(Clone)]
pub struct AuthBackend {
    api_keys: ApiKeyValidator,
    jwt: JwtValidator,
    provider: Arc<dyn IdentityProvider>,
}

impl AuthBackend {
    pub fn new(store: Arc<dyn AuthStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            api_keys: ApiKeyValidator::new(Arc::clone(&store)),
            jwt: JwtValidator::new(Arc::clone(&provider), store),
            provider,
        }
    }

    /// Production wiring: Postgres store plus Supabase Auth.
    pub fn connect(pool: PgPool, config: AuthConfig) -> Result<Self, ProviderError> {
        let provider = SupabaseIdentityProvider::new(config)?;
        Ok(Self::new(
            Arc::new(PgAuthStore::new(pool)),
            Arc::new(provider),
        ))
    }

    /// Resolve an `Authorization` header through whichever validator its
    /// credential family belongs to.
    pub async fn authenticate(
        &self,
        header: Option<&HeaderValue>,
    ) -> Result<AuthContext, AuthError> {
        match classify(header)? {
            Credential::ApiKey(raw_key) => self.api_keys.validate(raw_key).await.map(Into::into),
            Credential::Jwt(token) => self.jwt.validate(token).await.map(Into::into),
        }
    }

    /// Like [`authenticate`](Self::authenticate) but only JWTs are accepted.
    pub async fn authenticate_jwt(
        &self,
        header: Option<&HeaderValue>,
    ) -> Result<JwtContext, AuthError> {
        match classify(header)? {
            Credential::Jwt(token) => self.jwt.validate(token).await,
            Credential::ApiKey(_) => Err(AuthError::InvalidTokenFormat),
        }
    }

    /// Validate a bare access token supplied outside the `Authorization` header.
    pub async fn validate_jwt(&self, token: &str) -> Result<JwtContext, AuthError> {
        self.jwt.validate(token).await
    }

    /// Exchange a refresh token for a new provider session.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::InvalidRefreshToken);
        }

        self.provider
            .refresh(refresh_token)
            .await
            .map_err(|e| match e {
                ProviderError::Rejected { status, message } => {
                    tracing::debug!(status, message = %message, "Identity provider rejected refresh token");
                    AuthError::InvalidRefreshToken
                }
                ProviderError::Unavailable(detail) => {
                    AuthError::internal(format!("Session refresh failed: {}", detail))
                }
            })
    }
}
