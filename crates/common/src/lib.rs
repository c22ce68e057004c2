//! Shared utilities, configuration, and error handling for Habitrack
//!
//! This crate provides common functionality used across the Habitrack API:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP rendering
//! - API key generation and digests
//! - Validating request extractors

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::{Config, Environment};
pub use crypto::{generate_api_key, hash_api_key};
pub use db::is_unique_violation;
pub use error::{Error, FieldError, Result};
pub use extractors::{ValidatedJson, ValidatedQuery};
