//! Shared utilities for CLI commands.

use chrono::{Local, NaiveDate, NaiveTime};

use safehours_core::time::{parse_clock, parse_date};
use safehours_core::{Hours, Severity, ValidationError};

/// Clap value parser for `YYYY-MM-DD` dates.
pub fn parse_date_arg(value: &str) -> Result<NaiveDate, ValidationError> {
    parse_date(value)
}

/// Clap value parser for `HH:MM` or `HH:MM:SS` clock times.
pub fn parse_clock_arg(value: &str) -> Result<NaiveTime, ValidationError> {
    parse_clock("time", value)
}

/// The given date, or today's local date.
pub fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Formats a day for report headers, e.g. "Monday, Jun 10, 2024".
pub fn format_day(date: NaiveDate) -> String {
    date.format("%A, %b %-d, %Y").to_string()
}

/// Formats hours as "Xh Ym", or "Ym" under an hour.
pub fn format_duration(hours: Hours) -> String {
    let (h, m) = hours.non_negative().hours_minutes();
    if h >= 1 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

/// Right-aligned one-decimal hours cell.
pub fn hours_cell(hours: Hours, width: usize) -> String {
    format!("{:>width$}", format!("{hours:.1}"))
}

/// Generates a 10-character bar for `value` relative to `max`.
/// Values under 5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: Hours, max: Hours) -> String {
    if max.as_millis() <= 0 {
        return "░░░░░░░░░░".to_string();
    }

    let value = value.non_negative().as_millis();
    let ratio = value as f64 / max.as_millis() as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Short marker shown next to a classified metric.
pub const fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Normal => "  ",
        Severity::Caution => "! ",
        Severity::Warning => "!!",
    }
}
