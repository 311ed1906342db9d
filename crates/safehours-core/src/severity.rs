//! Threshold classification of duty metrics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How concerning a metric value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Caution,
    Warning,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Caution => "caution",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The metrics the classifier knows thresholds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    FlightHours,
    ContactHours,
    ConsecutiveDays,
    DutyDay,
    PastSevenDays,
    RestHours,
}

impl MetricKind {
    /// Panel order.
    pub const ALL: [Self; 6] = [
        Self::FlightHours,
        Self::ContactHours,
        Self::ConsecutiveDays,
        Self::DutyDay,
        Self::PastSevenDays,
        Self::RestHours,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::FlightHours => "Flight Hours",
            Self::ContactHours => "Contact Hours",
            Self::ConsecutiveDays => "Consecutive Days",
            Self::DutyDay => "Duty Day",
            Self::PastSevenDays => "Past 7 Days",
            Self::RestHours => "Rest Hours",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const FLIGHT_CAUTION: f64 = 6.0;
const FLIGHT_WARNING: f64 = 8.0;
const CONTACT_CAUTION: f64 = 8.0;
const CONTACT_WARNING: f64 = 10.0;
const CONSECUTIVE_LIMIT: f64 = 15.0;
const DUTY_CAUTION: f64 = 14.0;
const DUTY_WARNING: f64 = 16.0;
const PAST_SEVEN_CAUTION: f64 = 40.0;
const PAST_SEVEN_WARNING: f64 = 50.0;
const REST_MINIMUM: f64 = 10.0;

/// Maps a metric value to a severity.
///
/// Hours for every metric except consecutive days, which is a day count.
/// Exactly zero rest is a caution while a short non-zero rest is a warning;
/// that ordering is intentional and kept as-is.
#[expect(
    clippy::float_cmp,
    reason = "thresholds are exact boundaries; fixed-point hours convert exactly at whole values"
)]
pub fn classify(kind: MetricKind, value: f64) -> Severity {
    let (warning, caution) = match kind {
        MetricKind::FlightHours => (value > FLIGHT_WARNING, value > FLIGHT_CAUTION),
        MetricKind::ContactHours => (value >= CONTACT_WARNING, value > CONTACT_CAUTION),
        MetricKind::ConsecutiveDays => (value > CONSECUTIVE_LIMIT, value == CONSECUTIVE_LIMIT),
        MetricKind::DutyDay => (value > DUTY_WARNING, value > DUTY_CAUTION),
        MetricKind::PastSevenDays => (value > PAST_SEVEN_WARNING, value >= PAST_SEVEN_CAUTION),
        MetricKind::RestHours => (value > 0.0 && value < REST_MINIMUM, value == 0.0),
    };
    if warning {
        Severity::Warning
    } else if caution {
        Severity::Caution
    } else {
        Severity::Normal
    }
}
