//! API key validation
//!
//! Keys are opaque secrets; only their SHA-256 digest is stored, so lookup is
//! by digest equality. A successful validation records `last_used_at` in a
//! detached task that never affects the outcome of the request.

use std::sync::Arc;

use habitrack_common::hash_api_key;
use uuid::Uuid;

use crate::context::ApiKeyContext;
use crate::error::AuthError;
use crate::scope::DbScope;
use crate::store::AuthStore;
use crate::types::AuthIdentity;

/// Placeholder email for key owners without a stored address.
pub fn synthetic_email(user_id: Uuid) -> String {
    format!("user-{}@api-key.local", user_id)
}

#[derive(Clone)]
pub struct ApiKeyValidator {
    store: Arc<dyn AuthStore>,
}

impl ApiKeyValidator {
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self { store }
    }

    pub async fn validate(&self, raw_key: &str) -> Result<ApiKeyContext, AuthError> {
        if raw_key.is_empty() {
            return Err(AuthError::MissingApiKey);
        }

        let key_hash = hash_api_key(raw_key);

        let record = self
            .store
            .find_active_api_key(&key_hash)
            .await
            .map_err(|e| AuthError::internal(format!("API key lookup failed: {}", e)))?
            .ok_or(AuthError::InvalidApiKey)?;

        if record.revoked_at.is_some() {
            tracing::warn!(api_key_id = %record.id, "Active key lookup returned a revoked key");
            return Err(AuthError::ApiKeyRevoked);
        }

        self.touch(record.id);

        let user = AuthIdentity {
            id: record.user_id,
            email: record
                .user_email
                .clone()
                .unwrap_or_else(|| synthetic_email(record.user_id)),
        };

        tracing::debug!(user_id = %user.id, api_key_id = %record.id, "API key authenticated");

        Ok(ApiKeyContext {
            scope: DbScope::Owner { user_id: user.id },
            api_key: record.into(),
            user,
        })
    }

    /// Best-effort `last_used_at` update; failures are logged and dropped.
    fn touch(&self, api_key_id: Uuid) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.touch_api_key(api_key_id).await {
                tracing::warn!(error = %e, api_key_id = %api_key_id, "Failed to update api_key last_used_at");
            }
        });
    }
}
