//! Authentication configuration

use std::time::Duration;

use habitrack_common::Config;

/// Identity provider connection settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the Supabase project, without trailing slash
    pub supabase_url: String,
    /// Key sent as `apikey` on every provider call
    pub api_key: String,
    /// Upper bound for a single provider round trip
    pub timeout: Duration,
}

impl From<&Config> for AuthConfig {
    fn from(config: &Config) -> Self {
        Self {
            supabase_url: config.supabase_url.clone(),
            api_key: config.provider_api_key().to_string(),
            timeout: Duration::from_secs(config.identity_provider_timeout_secs),
        }
    }
}
