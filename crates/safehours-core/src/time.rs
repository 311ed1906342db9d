//! Date and clock-time arithmetic.
//!
//! Every activity lives inside a single local calendar day. Instants are built
//! by combining that date with a clock time; no timezone conversion happens and
//! every day is treated as exactly 24 hours long.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::types::{Hours, ValidationError};

/// Combines a calendar date with a clock time.
pub fn instant(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// Elapsed hours between two clock times on the same date.
///
/// An end before the start yields zero rather than a negative span.
pub fn elapsed(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Hours {
    Hours::from_duration(instant(date, end) - instant(date, start)).non_negative()
}

/// The last accepted instant of a date (`23:59:59`).
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
}

/// Computes the end time for an activity starting at `start` and lasting `duration`.
///
/// The result is rounded down to the minute. Anything ending after
/// `23:59:59` of `date` is rejected.
pub fn end_after(
    date: NaiveDate,
    start: NaiveTime,
    duration: Hours,
) -> Result<NaiveTime, ValidationError> {
    if duration.is_negative() {
        return Err(ValidationError::NegativeDuration);
    }
    let end = instant(date, start)
        .checked_add_signed(duration.to_duration())
        .ok_or(ValidationError::PastMidnight { date })?;
    if end > end_of_day(date) {
        return Err(ValidationError::PastMidnight { date });
    }
    Ok(floor_to_minute(end.time()))
}

/// `HH:MM` of `date 00:00 + hours`, rounded down to the minute.
pub fn clock_at(date: NaiveDate, hours: Hours) -> String {
    let at = instant(date, NaiveTime::MIN)
        .checked_add_signed(hours.to_duration())
        .unwrap_or_else(|| end_of_day(date));
    format_clock(at.time())
}

/// Formats a clock time as zero-padded `HH:MM`.
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Drops seconds and sub-second precision.
pub fn floor_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// The previous calendar day, or `None` at the calendar minimum.
pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// First day of the inclusive `days`-long window ending at `end`.
pub fn window_start(end: NaiveDate, days: u64) -> NaiveDate {
    end.checked_sub_days(Days::new(days.saturating_sub(1)))
        .unwrap_or(NaiveDate::MIN)
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset))
        .unwrap_or(NaiveDate::MIN)
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidDate {
            value: value.to_string(),
        }
    })
}

/// Parses `H:MM`, `HH:MM` or `HH:MM:SS`.
pub fn parse_clock(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ValidationError::InvalidTime {
            field,
            value: value.to_string(),
        })
}
