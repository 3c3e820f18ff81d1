//! Validation of user-entered limit, time slot and handle values.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[allow(clippy::expect_used)]
static LIMIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("limit pattern compiles"));

#[allow(clippy::expect_used)]
pub(super) static TIME_SLOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}:[0-9]{2} - [0-9]{2}:[0-9]{2}$").expect("time slot pattern compiles")
});

/// Errors raised by malformed user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Not a number: '{0}'")]
    InvalidLimit(String),

    #[error("Limit must not be negative: '{0}'")]
    NegativeLimit(String),

    #[error("Invalid time slot '{0}' (expected HH:MM - HH:MM)")]
    InvalidTimeSlot(String),

    #[error("Invalid Telegram handle: '{0}'")]
    InvalidHandle(String),
}

/// Parses a limit value typed by the user.
///
/// Accepts plain decimal numbers only (`12`, `0.5`); signs, exponents and
/// special values are rejected.
pub fn parse_limit(input: &str) -> Result<f64, ValidationError> {
    let input = input.trim();

    if !LIMIT_PATTERN.is_match(input) {
        let is_negative = input
            .strip_prefix('-')
            .is_some_and(|rest| LIMIT_PATTERN.is_match(rest.trim_start()));
        return Err(if is_negative {
            ValidationError::NegativeLimit(input.to_owned())
        } else {
            ValidationError::InvalidLimit(input.to_owned())
        });
    }

    input
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::InvalidLimit(input.to_owned()))
}

/// Checks that a limit loaded from configuration is usable.
pub fn check_limit(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidLimit(value.to_string()));
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeLimit(value.to_string()));
    }
    Ok(value)
}

/// Normalizes a Telegram handle to its canonical `@handle` form.
pub fn normalize_handle(input: &str) -> Result<String, ValidationError> {
    let input = input.trim();
    let body = input.strip_prefix('@').unwrap_or(input);

    if body.is_empty() || body.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidHandle(input.to_owned()));
    }

    Ok(format!("@{body}"))
}
