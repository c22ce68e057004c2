//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Parsing goes through a lookup
//! closure so the rules can be tested without touching the process env.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(anyhow!(
                "APP_ENV must be one of development, production, test (got {})",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (Supabase PostgreSQL)
    pub database_url: String,

    /// Supabase configuration
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// `None` when unset or still a placeholder; only allowed outside production
    pub supabase_service_role_key: Option<String>,

    /// Runtime configuration
    pub environment: Environment,
    pub port: u16,
    pub cors_allowed_origins: String,
    pub identity_provider_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{} is required", key))
        };

        let environment = match lookup("APP_ENV") {
            Some(value) => Environment::parse(&value)?,
            None => Environment::Development,
        };
        let strict = environment != Environment::Test;

        let database_url = required("DATABASE_URL")?;

        let supabase_url = required("SUPABASE_URL")?;
        if !(supabase_url.starts_with("https://") || supabase_url.starts_with("http://")) {
            return Err(anyhow!("SUPABASE_URL must be a valid http(s) URL"));
        }

        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;
        if strict && !supabase_anon_key.starts_with("eyJ") {
            return Err(anyhow!(
                "SUPABASE_ANON_KEY must be a valid JWT token (starts with eyJ)"
            ));
        }

        let supabase_service_role_key = lookup("SUPABASE_SERVICE_ROLE_KEY")
            .filter(|key| !key.is_empty() && !key.starts_with("placeholder"))
            .filter(|key| !strict || key.starts_with("eyJ"));

        if supabase_service_role_key.is_none() {
            if environment == Environment::Production {
                return Err(anyhow!(
                    "SUPABASE_SERVICE_ROLE_KEY is required in production"
                ));
            }
            tracing::warn!("SUPABASE_SERVICE_ROLE_KEY not configured - using anon key");
        }

        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| anyhow!("PORT must be a valid port number"))?,
            None => DEFAULT_PORT,
        };

        let identity_provider_timeout_secs = match lookup("IDENTITY_PROVIDER_TIMEOUT_SECS") {
            Some(value) => value
                .parse()
                .map_err(|_| anyhow!("IDENTITY_PROVIDER_TIMEOUT_SECS must be an integer"))?,
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url,
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            supabase_service_role_key,
            environment,
            port,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
            identity_provider_timeout_secs,
        })
    }

    /// Key used for server-side calls to the identity provider.
    pub fn provider_api_key(&self) -> &str {
        self.supabase_service_role_key
            .as_deref()
            .unwrap_or(&self.supabase_anon_key)
    }
}
