//! Core type definitions with validation.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Sub};
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for records entering the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A calendar date could not be parsed.
    #[error("invalid date: {value} (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    /// A clock time could not be parsed.
    #[error("invalid {field} time: {value} (expected HH:MM)")]
    InvalidTime { field: &'static str, value: String },

    /// An hour quantity could not be parsed or was not finite.
    #[error("invalid {field}: {value}")]
    InvalidHours { field: &'static str, value: String },

    /// The activity category is not one of the known kinds.
    #[error("unknown activity: {value}")]
    UnknownActivityKind { value: String },

    /// The activity would end after 23:59:59 on its own date.
    #[error("activity on {date} cannot go past midnight")]
    PastMidnight { date: NaiveDate },

    /// The end time precedes the start time.
    #[error("end {end} must not be before start {start}")]
    EndBeforeStart { start: NaiveTime, end: NaiveTime },

    /// A negative duration was supplied.
    #[error("duration cannot be negative")]
    NegativeDuration,

    /// A negative pre/post buffer was supplied.
    #[error("pre/post time cannot be negative")]
    NegativePrePost,

    /// A pre/post buffer longer than a whole day was supplied.
    #[error("pre/post time of {hours} h exceeds {max} h")]
    PrePostTooLong { hours: Hours, max: Hours },

    /// The activity intersects another activity on the same date.
    #[error("time conflict on {date}: overlaps {start}-{end}")]
    Overlap {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
}

/// A fixed-point hour quantity with millisecond resolution.
///
/// Sums of many activities stay exact, unlike repeated `f64` addition. The
/// float form only appears at the classification and display boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours(i64);

impl Hours {
    pub const ZERO: Self = Self(0);

    /// Creates an hour value from whole milliseconds.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Creates an hour value from whole minutes.
    #[must_use]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes * 60_000)
    }

    /// Creates an hour value from fractional hours, rounding to the millisecond.
    ///
    /// Returns `None` for NaN or infinite input.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "value is rounded and realistic hour counts fit in i64 millis"
    )]
    pub fn from_hours(hours: f64) -> Option<Self> {
        if !hours.is_finite() {
            return None;
        }
        Some(Self((hours * 3_600_000.0).round() as i64))
    }

    /// Converts a chrono duration, truncating sub-millisecond precision.
    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        Self(duration.num_milliseconds())
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "millisecond counts stay far below 2^52"
    )]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 3_600_000.0
    }

    /// Converts to a chrono duration, clamped to the range chrono accepts.
    #[must_use]
    pub fn to_duration(self) -> Duration {
        Duration::try_milliseconds(self.0).unwrap_or(if self.0 < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        })
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    #[must_use]
    pub const fn non_negative(self) -> Self {
        if self.0 < 0 { Self::ZERO } else { self }
    }

    /// Splits the value into two halves that sum back to exactly `self`.
    ///
    /// The first half takes the smaller share when the millisecond count is odd.
    #[must_use]
    pub const fn halves(self) -> (Self, Self) {
        let first = self.0 / 2;
        (Self(first), Self(self.0 - first))
    }

    /// Whole hours and remaining minutes, rounded down.
    #[must_use]
    pub const fn hours_minutes(self) -> (i64, i64) {
        let minutes = self.0 / 60_000;
        (minutes / 60, minutes % 60)
    }
}

impl Add for Hours {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Hours {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Hours {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Div<i64> for Hours {
    type Output = Self;

    /// Integer division; division by zero yields zero.
    fn div(self, rhs: i64) -> Self {
        if rhs == 0 { Self::ZERO } else { Self(self.0 / rhs) }
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Hours {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*}", precision, self.as_f64()),
            None => write!(f, "{:.1}", self.as_f64()),
        }
    }
}

impl FromStr for Hours {
    type Err = ValidationError;

    /// Parses a decimal hour string such as `"1.5"`. Empty input is zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Self::from_hours)
            .ok_or_else(|| ValidationError::InvalidHours {
                field: "hours",
                value: s.to_string(),
            })
    }
}

impl Serialize for Hours {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_f64().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::from_hours(value)
            .ok_or_else(|| serde::de::Error::custom(format!("non-finite hours: {value}")))
    }
}

/// A validated activity identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActivityId(String);

impl ActivityId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "activity ID",
            });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading characters shown in listings.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

impl TryFrom<String> for ActivityId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActivityId> for String {
    fn from(id: ActivityId) -> Self {
        id.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ActivityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_id_rejects_empty() {
        assert!(ActivityId::new("").is_err());
        assert!(ActivityId::new("   ").is_err());
        assert!(ActivityId::new("a1b2c3").is_ok());
    }

    #[test]
    fn activity_id_short_prefix() {
        let id = ActivityId::new("0123456789abcdef").unwrap();
        assert_eq!(id.short(), "01234567");
        let id = ActivityId::new("abc").unwrap();
        assert_eq!(id.short(), "abc");
    }

    #[test]
    fn activity_id_serde_rejects_empty() {
        let result: Result<ActivityId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn hours_from_fractional_value() {
        assert_eq!(Hours::from_hours(1.5), Some(Hours::from_minutes(90)));
        assert_eq!(Hours::from_hours(0.25), Some(Hours::from_minutes(15)));
        assert_eq!(Hours::from_hours(f64::NAN), None);
        assert_eq!(Hours::from_hours(f64::INFINITY), None);
    }

    #[test]
    fn hours_sum_is_exact() {
        // Ten 0.1h entries are exactly 1h; float addition would give 0.9999...
        let tenth = Hours::from_hours(0.1).unwrap();
        let total: Hours = std::iter::repeat_n(tenth, 10).sum();
        assert_eq!(total, Hours::from_minutes(60));
    }

    #[test]
    fn hours_halves_sum_back() {
        let odd = Hours::from_millis(3);
        let (a, b) = odd.halves();
        assert_eq!(a + b, odd);
        let (pre, post) = Hours::from_minutes(60).halves();
        assert_eq!(pre, Hours::from_minutes(30));
        assert_eq!(post, Hours::from_minutes(30));
    }

    #[test]
    fn hours_division_by_zero_is_zero() {
        assert_eq!(Hours::from_minutes(60) / 0, Hours::ZERO);
        assert_eq!(Hours::from_minutes(60) / 4, Hours::from_minutes(15));
    }

    #[test]
    fn hours_parse_decimal_strings() {
        assert_eq!("1.0".parse::<Hours>().unwrap(), Hours::from_minutes(60));
        assert_eq!(" 2.5 ".parse::<Hours>().unwrap(), Hours::from_minutes(150));
        assert_eq!("".parse::<Hours>().unwrap(), Hours::ZERO);
        assert!("abc".parse::<Hours>().is_err());
        assert!("inf".parse::<Hours>().is_err());
    }

    #[test]
    fn hours_display_one_decimal_by_default() {
        assert_eq!(Hours::from_minutes(90).to_string(), "1.5");
        assert_eq!(format!("{:.2}", Hours::from_minutes(20)), "0.33");
    }

    #[test]
    fn hours_hours_minutes_floor() {
        assert_eq!(Hours::from_minutes(125).hours_minutes(), (2, 5));
        assert_eq!(Hours::from_millis(59_999).hours_minutes(), (0, 0));
    }

    #[test]
    fn hours_serde_as_float() {
        let json = serde_json::to_string(&Hours::from_minutes(90)).unwrap();
        assert_eq!(json, "1.5");
        let parsed: Hours = serde_json::from_str("0.5").unwrap();
        assert_eq!(parsed, Hours::from_minutes(30));
    }

    #[test]
    fn hours_non_negative_clamps() {
        assert_eq!(Hours::from_minutes(-30).non_negative(), Hours::ZERO);
        assert_eq!(Hours::from_minutes(30).non_negative(), Hours::from_minutes(30));
    }
}
