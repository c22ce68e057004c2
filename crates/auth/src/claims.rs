//! JWT claims installed into row-level-security scopes

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{json, Map, Value};

use crate::provider::ProviderUser;

/// Claims of an access token the identity provider has already verified.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionClaims(Map<String, Value>);

impl SessionClaims {
    /// Read the payload of a provider-verified token.
    ///
    /// The signature is not checked here: `IdentityProvider::verify` accepted
    /// the token before this is called. Returns `None` if the payload is not a
    /// JSON object.
    pub fn read(token: &str) -> Option<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        match decode::<Map<String, Value>>(token, &DecodingKey::from_secret(&[]), &validation) {
            Ok(data) => Some(Self(data.claims)),
            Err(e) => {
                tracing::debug!(error = %e, "Verified token payload is unreadable");
                None
            }
        }
    }

    /// Minimal claims for a user when the token payload cannot be read.
    pub fn synthesize(user: &ProviderUser) -> Self {
        let value = json!({
            "sub": user.id.to_string(),
            "email": user.email,
            "role": "authenticated",
        });

        match value {
            Value::Object(map) => Self(map),
            _ => Self(Map::new()),
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }

    /// Token expiry from the `exp` claim.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.0
            .get("exp")
            .and_then(Value::as_i64)
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
