//! API key generation and digests
//!
//! Keys are 16 bytes from the OS RNG, hex encoded. Only the SHA-256 digest is
//! stored; lookups recompute the digest from the presented secret, so the
//! digest must stay deterministic (no salt).

use sha2::{Digest, Sha256};

use crate::error::Error;

/// Number of random bytes in a generated API key (32 hex characters).
const API_KEY_BYTES: usize = 16;

/// Generate a fresh API key secret.
///
/// The alphabet is lowercase hex, so a generated key can never begin with
/// `ey` and be mistaken for a JWT by the credential classifier.
pub fn generate_api_key() -> Result<String, Error> {
    let mut bytes = [0u8; API_KEY_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| Error::Internal(format!("Failed to generate random bytes: {}", e)))?;
    Ok(hex::encode(bytes))
}

/// Lowercase hex SHA-256 digest of an API key secret.
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}
