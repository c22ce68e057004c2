//! JWT validation
//!
//! Signature and expiry are checked by the identity provider, never locally.
//! A verified user that has no local row yet gets one on first sight.

use std::sync::Arc;

use crate::claims::SessionClaims;
use crate::context::JwtContext;
use crate::error::AuthError;
use crate::provider::{IdentityProvider, ProviderError, ProviderUser};
use crate::scope::DbScope;
use crate::store::{AuthStore, StoreError};
use crate::types::{AuthIdentity, SessionInfo};

/// Header, payload, signature.
const JWT_SEGMENTS: usize = 3;

#[derive(Clone)]
pub struct JwtValidator {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn AuthStore>,
}

impl JwtValidator {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn AuthStore>) -> Self {
        Self { provider, store }
    }

    pub async fn validate(&self, token: &str) -> Result<JwtContext, AuthError> {
        if token.split('.').count() != JWT_SEGMENTS {
            return Err(AuthError::InvalidTokenFormat);
        }

        let provider_user = self.provider.verify(token).await.map_err(|e| match e {
            ProviderError::Rejected { status, message } => {
                tracing::debug!(status, message = %message, "Identity provider rejected token");
                AuthError::InvalidOrExpiredToken
            }
            ProviderError::Unavailable(detail) => {
                AuthError::internal(format!("Token verification failed: {}", detail))
            }
        })?;

        let user = self.ensure_local_user(&provider_user).await?;

        let claims = SessionClaims::read(token)
            .unwrap_or_else(|| SessionClaims::synthesize(&provider_user));

        let session = SessionInfo {
            access_token: token.to_string(),
            expires_at: claims.expires_at(),
        };

        tracing::debug!(user_id = %user.id, "JWT authenticated");

        Ok(JwtContext {
            scope: DbScope::RowLevel {
                user_id: user.id,
                claims: claims.into_value(),
            },
            email_verified: provider_user.email_confirmed_at.is_some(),
            session,
            user,
        })
    }

    /// Read-through-create of the local user row (JIT provisioning).
    ///
    /// Losing an insert race to a concurrent first request is success: the
    /// row exists either way.
    async fn ensure_local_user(
        &self,
        provider_user: &ProviderUser,
    ) -> Result<AuthIdentity, AuthError> {
        let user_id = provider_user.id;
        let verified_email = provider_user
            .email
            .as_deref()
            .filter(|email| !email.is_empty());

        match self.store.find_user(user_id).await {
            // The provider's address wins over a possibly stale local copy
            Ok(Some(user)) => {
                return Ok(AuthIdentity {
                    id: user.id,
                    email: verified_email.map(str::to_string).unwrap_or(user.email),
                })
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, user_id = %user_id, "Failed to load user");
                return Err(AuthError::UserProvisioningFailed);
            }
        }

        let email = verified_email.ok_or_else(|| {
            tracing::error!(user_id = %user_id, "Identity provider returned a user without email");
            AuthError::UserProvisioningFailed
        })?;

        match self.store.insert_user(user_id, email).await {
            Ok(()) => tracing::info!(user_id = %user_id, "JIT user provisioned"),
            Err(StoreError::Conflict) => {
                tracing::debug!(user_id = %user_id, "User provisioned by a concurrent request")
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %user_id, "Failed to provision user");
                return Err(AuthError::UserProvisioningFailed);
            }
        }

        Ok(AuthIdentity {
            id: user_id,
            email: email.to_string(),
        })
    }
}
