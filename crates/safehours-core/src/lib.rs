//! Core duty-time engine.
//!
//! This crate contains the data model and pure calculations for:
//! - Daily metrics: flight, contact, duty day, rest, rolling 7-day hours, streaks
//! - Weekly aggregation: Sunday–Saturday breakdown, averages, trend
//! - Severity classification of metrics against fixed thresholds
//! - Write-boundary validation for new and edited activities
//!
//! Nothing here performs I/O; hosts pass in a snapshot of activities and a
//! reference date and render what comes back.

mod activity;
pub mod metrics;
pub mod severity;
pub mod time;
pub mod timeline;
mod types;
pub mod validation;
pub mod weekly;

pub use activity::{Activity, ActivityKind, ActivityRecord, parse_records};
pub use metrics::DutyMetrics;
pub use severity::{MetricKind, Severity, classify};
pub use timeline::{SegmentKind, TimelineSegment, day_timeline};
pub use types::{ActivityId, Hours, ValidationError};
pub use validation::{ActivityEdit, apply_edit, apply_edits, check_overlap, validate_new};
pub use weekly::{Category, CategoryTotals, DayBreakdown, WeeklySummary, weekly_summary};
