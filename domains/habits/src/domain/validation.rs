//! Validation helpers for request DTOs
//!
//! Plain functions so they can back `#[validate(custom(...))]` attributes and
//! be tested on their own.

use chrono::{Days, NaiveDate, Utc};
use regex::Regex;
use validator::ValidationError;

lazy_static::lazy_static! {
    /// `#RRGGBB`, either case
    pub static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();

    /// `YYYY-MM-DD`; calendar validity is checked separately
    pub static ref DATE_REGEX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !DATE_REGEX.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_REGEX.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color").with_message("Invalid hex color format".into()))
    }
}

/// Rejects values that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("Value cannot be blank".into()))
    } else {
        Ok(())
    }
}

pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    match parse_date(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("date")
            .with_message("Invalid date format (YYYY-MM-DD)".into())),
    }
}

/// Check-in dates may be at most one day ahead of today (UTC).
pub fn validate_check_in_date(value: &str) -> Result<(), ValidationError> {
    let date = parse_date(value).ok_or_else(|| {
        ValidationError::new("date").with_message("Invalid date format (YYYY-MM-DD)".into())
    })?;

    let today = Utc::now().date_naive();
    let latest = today.checked_add_days(Days::new(1)).unwrap_or(today);

    if date > latest {
        return Err(ValidationError::new("future_date")
            .with_message("Date cannot be more than 1 day in the future".into()));
    }

    Ok(())
}
