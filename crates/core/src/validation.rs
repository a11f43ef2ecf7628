//! Input validation utilities.
//!
//! Request bodies arrive from HTML forms as often as from typed clients, so dates and numbers
//! may be strings. These helpers turn raw inputs into checked values and phrase failures as
//! `MutuError::Validation` messages naming the offending field.

use crate::{MutuError, MutuResult};
use chrono::{DateTime, NaiveDate};
use mutu_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// Validates that a cookie name is a plain HTTP token.
///
/// The name is written verbatim into `Set-Cookie` headers, so it is restricted to a
/// conservative ASCII set.
pub fn validate_cookie_name(name: &str) -> MutuResult<()> {
    const MAX_COOKIE_NAME_LEN: usize = 64;

    if name.trim().is_empty() {
        return Err(MutuError::Validation(
            "session cookie name cannot be empty".into(),
        ));
    }

    if name.len() > MAX_COOKIE_NAME_LEN {
        return Err(MutuError::Validation(format!(
            "session cookie name exceeds maximum length of {} characters",
            MAX_COOKIE_NAME_LEN
        )));
    }

    let ok = name
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_' | b'.'));

    if !ok {
        return Err(MutuError::Validation(
            "session cookie name contains invalid characters (only alphanumeric, '.', '-', '_' allowed)"
                .into(),
        ));
    }

    Ok(())
}

/// Parses a required text field, reporting the field name when it is blank.
pub fn required_text(field: &str, value: &str) -> MutuResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|_| MutuError::Validation(format!("{field} is required")))
}

/// Parses a calendar date.
///
/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps (the date part is kept), which covers both
/// `<input type="date">` values and serialised JavaScript dates.
pub fn parse_date(field: &str, value: &str) -> MutuResult<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MutuError::Validation(format!("{field} is required")));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| {
            MutuError::Validation(format!(
                "{field} must be a date (YYYY-MM-DD), got '{trimmed}'"
            ))
        })
}

/// A number as submitted by a client: either a JSON number or a numeric string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

impl NumericInput {
    /// Parses into a finite `f64`; NaN and infinities are rejected.
    pub fn parse(&self, field: &str) -> MutuResult<f64> {
        let value = match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(s) => s.trim().replace(',', ".").parse::<f64>().map_err(|_| {
                MutuError::Validation(format!("{field} must be a number, got '{}'", s.trim()))
            })?,
        };

        if !value.is_finite() {
            return Err(MutuError::Validation(format!(
                "{field} must be a finite number"
            )));
        }

        Ok(value)
    }
}
