//! Authentication context handed to route handlers
//!
//! Exactly one variant per request. Both expose the same identity; only the
//! API-key variant carries key metadata and only the JWT variant carries
//! session metadata.

use serde::Serialize;
use uuid::Uuid;

use crate::scope::DbScope;
use crate::types::{AuthApiKey, AuthIdentity, SessionInfo};

/// Context produced by a valid API key.
#[derive(Debug, Clone)]
pub struct ApiKeyContext {
    pub user: AuthIdentity,
    pub api_key: AuthApiKey,
    pub scope: DbScope,
}

/// Context produced by a provider-verified JWT.
#[derive(Debug, Clone)]
pub struct JwtContext {
    pub user: AuthIdentity,
    pub email_verified: bool,
    pub session: SessionInfo,
    pub scope: DbScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey,
    Jwt,
}

#[derive(Debug, Clone)]
pub enum AuthContext {
    ApiKey(ApiKeyContext),
    Jwt(JwtContext),
}

impl AuthContext {
    pub fn user(&self) -> &AuthIdentity {
        match self {
            AuthContext::ApiKey(ctx) => &ctx.user,
            AuthContext::Jwt(ctx) => &ctx.user,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user().id
    }

    /// Database scope every repository call for this request must go through.
    pub fn scope(&self) -> &DbScope {
        match self {
            AuthContext::ApiKey(ctx) => &ctx.scope,
            AuthContext::Jwt(ctx) => &ctx.scope,
        }
    }

    pub fn method(&self) -> AuthMethod {
        match self {
            AuthContext::ApiKey(_) => AuthMethod::ApiKey,
            AuthContext::Jwt(_) => AuthMethod::Jwt,
        }
    }
}

impl From<ApiKeyContext> for AuthContext {
    fn from(ctx: ApiKeyContext) -> Self {
        AuthContext::ApiKey(ctx)
    }
}

impl From<JwtContext> for AuthContext {
    fn from(ctx: JwtContext) -> Self {
        AuthContext::Jwt(ctx)
    }
}
