//! Axum extractors for authentication
//!
//! Generic over any state `S` where `AuthBackend: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern. A rejection is an
//! [`AuthError`] response; the handler body never runs.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::backend::AuthBackend;
use crate::context::{AuthContext, JwtContext};
use crate::error::AuthError;

/// Dual-auth extractor: API key or JWT, decided by the credential shape.
#[derive(Debug)]
pub struct DualAuth(pub AuthContext);

impl<S> FromRequestParts<S> for DualAuth
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);
        let context = backend.authenticate(parts.headers.get(AUTHORIZATION)).await?;

        Ok(DualAuth(context))
    }
}

/// JWT-only extractor for session endpoints and key issuance.
#[derive(Debug)]
pub struct JwtAuth(pub JwtContext);

impl<S> FromRequestParts<S> for JwtAuth
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);
        let context = backend
            .authenticate_jwt(parts.headers.get(AUTHORIZATION))
            .await?;

        Ok(JwtAuth(context))
    }
}
