//! Credential classification from the `Authorization` header
//!
//! Pure string inspection: JWTs issued by the identity provider always start
//! with `ey` (base64url of `{"`), opaque API keys never do. No I/O happens here.

use axum::http::HeaderValue;

use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";
const JWT_MARKER: &str = "ey";

/// A bearer credential routed to exactly one validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    ApiKey(&'a str),
    Jwt(&'a str),
}

impl<'a> Credential<'a> {
    /// The raw bearer payload, whichever family it was classified into.
    pub fn token(&self) -> &'a str {
        match self {
            Credential::ApiKey(token) | Credential::Jwt(token) => token,
        }
    }
}

/// Classify a raw header value.
///
/// An `Err` is the malformed outcome: no header at all, or a header that is
/// not a bearer credential.
pub fn classify(header: Option<&HeaderValue>) -> Result<Credential<'_>, AuthError> {
    let header = header.ok_or(AuthError::MissingAuthHeader)?;

    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthFormat)?;

    let token = header_str
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::InvalidAuthFormat)?;

    if token.starts_with(JWT_MARKER) {
        Ok(Credential::Jwt(token))
    } else {
        Ok(Credential::ApiKey(token))
    }
}
