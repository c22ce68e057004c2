//! Dual authentication for the Habitrack API
//!
//! Resolves an `Authorization: Bearer ...` header into a single [`AuthContext`]:
//! opaque API keys are digested and looked up in the auth store, JWTs are
//! verified by the identity provider and mirrored into the local `users`
//! table on first sight. Axum extractors expose the result to handlers and
//! work with any state implementing `FromRef<S>` for [`AuthBackend`].

mod api_key;
mod backend;
mod claims;
mod classifier;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
pub mod mock;
mod provider;
mod scope;
mod store;
mod types;

pub use api_key::{synthetic_email, ApiKeyValidator};
pub use backend::AuthBackend;
pub use claims::SessionClaims;
pub use classifier::{classify, Credential};
pub use config::AuthConfig;
pub use context::{ApiKeyContext, AuthContext, AuthMethod, JwtContext};
pub use error::AuthError;
pub use extractors::{DualAuth, JwtAuth};
pub use jwt::JwtValidator;
pub use provider::{
    IdentityProvider, ProviderError, ProviderSession, ProviderUser, SupabaseIdentityProvider,
};
pub use scope::DbScope;
pub use store::{ApiKeyRecord, AuthStore, PgAuthStore, StoreError};
pub use types::{AuthApiKey, AuthIdentity, SessionInfo};
