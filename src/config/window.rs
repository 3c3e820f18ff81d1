//! Daily activation time window.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::validation::{TIME_SLOT_PATTERN, ValidationError};

/// Window used until an operator sets one.
pub const DEFAULT_TIME_WINDOW: &str = "00:00 - 00:00";

const BOUNDARY_SEPARATOR: &str = " - ";

/// Activation window in UTC, stored exactly as the user entered it.
///
/// Only the `HH:MM - HH:MM` shape is enforced; out-of-range boundaries such
/// as `99:99` are kept and reported by [`TimeWindow::is_in_range`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeWindow(String);

impl TimeWindow {
    /// Parses a window from user input, trimming surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if TIME_SLOT_PATTERN.is_match(input) {
            Ok(Self(input.to_owned()))
        } else {
            Err(ValidationError::InvalidTimeSlot(input.to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the start and end as wall-clock times, if both are valid.
    #[must_use]
    pub fn bounds(&self) -> Option<(NaiveTime, NaiveTime)> {
        let (start, end) = self.0.split_once(BOUNDARY_SEPARATOR)?;
        let start = NaiveTime::parse_from_str(start, "%H:%M").ok()?;
        let end = NaiveTime::parse_from_str(end, "%H:%M").ok()?;
        Some((start, end))
    }

    /// Whether both boundaries are real clock times.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        self.bounds().is_some()
    }

    /// Whether the bot is active at `time`.
    ///
    /// Equal boundaries mean the whole day. A start after the end wraps
    /// past midnight. Returns `None` when the window is out of range.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> Option<bool> {
        let (start, end) = self.bounds()?;
        let active = match start.cmp(&end) {
            std::cmp::Ordering::Equal => true,
            std::cmp::Ordering::Less => start <= time && time < end,
            std::cmp::Ordering::Greater => time >= start || time < end,
        };
        Some(active)
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self(DEFAULT_TIME_WINDOW.to_owned())
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.0
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
