//! Activity records: the unit the engine consumes.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::time;
use crate::types::{Hours, ValidationError};

/// Scheduled activity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActivityKind {
    Flight,
    SimAtd,
    Ground,
    OtherScheduled,
}

impl ActivityKind {
    /// All kinds in display order.
    pub const ALL: [Self; 4] = [Self::Flight, Self::SimAtd, Self::Ground, Self::OtherScheduled];

    /// Display name used in records and exports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "Flight",
            Self::SimAtd => "SIM/ATD",
            Self::Ground => "Ground",
            Self::OtherScheduled => "Other Sched. Act.",
        }
    }

    /// Whether pre/post buffer time applies to this kind.
    pub const fn has_buffer(self) -> bool {
        matches!(self, Self::Flight | Self::SimAtd)
    }

    /// Whether this kind counts toward contact hours.
    pub const fn is_contact(self) -> bool {
        matches!(self, Self::Flight | Self::SimAtd | Self::Ground)
    }

    /// Whether this kind counts toward rolling and weekly totals.
    pub const fn counts_toward_totals(self) -> bool {
        !matches!(self, Self::OtherScheduled)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flight" => Ok(Self::Flight),
            "sim/atd" | "sim" | "atd" | "simulator" => Ok(Self::SimAtd),
            "ground" => Ok(Self::Ground),
            "other sched. act." | "other" | "other-scheduled" => Ok(Self::OtherScheduled),
            _ => Err(ValidationError::UnknownActivityKind {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for ActivityKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Longest pre/post buffer accepted for a single activity.
pub const MAX_PRE_POST: Hours = Hours::from_minutes(24 * 60);

/// A scheduled duty activity on a single calendar day.
///
/// Fields are public so hosts can build snapshots cheaply, but records should
/// go through [`Activity::new`] or [`crate::validation::apply_edit`] so the
/// same-day and non-negative invariants hold. Calculators tolerate records that
/// break them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub kind: ActivityKind,
    pub pre_post: Hours,
    #[serde(default)]
    pub note: String,
}

impl Activity {
    /// Creates an activity from a start time and duration.
    ///
    /// The end is derived as `start + duration`, rounded down to the minute.
    /// Pre/post time is dropped for kinds without a buffer.
    pub fn new(
        date: NaiveDate,
        start: NaiveTime,
        duration: Hours,
        kind: ActivityKind,
        pre_post: Hours,
        note: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let end = time::end_after(date, start, duration)?;
        Self::with_end(date, start, end, kind, pre_post, note)
    }

    /// Creates an activity from explicit start and end times.
    pub fn with_end(
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        kind: ActivityKind,
        pre_post: Hours,
        note: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::EndBeforeStart { start, end });
        }
        if time::instant(date, end) > time::end_of_day(date) {
            return Err(ValidationError::PastMidnight { date });
        }
        if pre_post.is_negative() {
            return Err(ValidationError::NegativePrePost);
        }
        if pre_post > MAX_PRE_POST {
            return Err(ValidationError::PrePostTooLong {
                hours: pre_post,
                max: MAX_PRE_POST,
            });
        }
        Ok(Self {
            date,
            start,
            end,
            kind,
            pre_post: if kind.has_buffer() {
                pre_post
            } else {
                Hours::ZERO
            },
            note: note.into(),
        })
    }

    /// Core duration, `end - start`.
    pub fn duration(&self) -> Hours {
        time::elapsed(self.date, self.start, self.end)
    }

    /// Effective pre/post buffer: zero for kinds without one.
    pub fn buffer(&self) -> Hours {
        if self.kind.has_buffer() {
            self.pre_post.non_negative()
        } else {
            Hours::ZERO
        }
    }

    /// Duration plus effective buffer.
    pub fn contact_time(&self) -> Hours {
        self.duration() + self.buffer()
    }

    pub fn start_instant(&self) -> NaiveDateTime {
        time::instant(self.date, self.start)
    }

    pub fn end_instant(&self) -> NaiveDateTime {
        time::instant(self.date, self.end)
    }

    /// Start moved earlier by half the buffer, saturating at the earliest
    /// representable instant.
    pub fn adjusted_start(&self) -> NaiveDateTime {
        let (pre, _) = self.buffer().halves();
        self.start_instant()
            .checked_sub_signed(pre.to_duration())
            .unwrap_or(NaiveDateTime::MIN)
    }

    /// End moved later by the other half of the buffer, saturating at the
    /// latest representable instant.
    pub fn adjusted_end(&self) -> NaiveDateTime {
        let (_, post) = self.buffer().halves();
        self.end_instant()
            .checked_add_signed(post.to_duration())
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// Whether the core windows of two activities intersect.
    ///
    /// Buffers are not part of the check; touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.date == other.date && !(self.end <= other.start || self.start >= other.end)
    }

    /// Converts to the string-field interchange shape.
    pub fn to_record(&self) -> ActivityRecord {
        ActivityRecord {
            date: self.date.format("%Y-%m-%d").to_string(),
            start: time::format_clock(self.start),
            end: time::format_clock(self.end),
            duration: format!("{:.2}", self.duration()),
            activity: self.kind.to_string(),
            // Shortest form that parses back to the same millisecond count
            pre_post: self.buffer().as_f64().to_string(),
            note: self.note.clone(),
        }
    }
}

/// The interchange shape of an activity, with every field as text.
///
/// This is what gets exported to CSV/JSON and read back from user files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub date: String,
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub duration: String,
    pub activity: String,
    #[serde(default)]
    pub pre_post: String,
    #[serde(default)]
    pub note: String,
}

impl TryFrom<&ActivityRecord> for Activity {
    type Error = ValidationError;

    /// Validates a record. `end` wins over `duration` when both are present.
    fn try_from(record: &ActivityRecord) -> Result<Self, Self::Error> {
        let date = time::parse_date(&record.date)?;
        let start = time::parse_clock("start", &record.start)?;
        let kind: ActivityKind = record.activity.parse()?;
        let pre_post: Hours =
            record
                .pre_post
                .parse()
                .map_err(|_| ValidationError::InvalidHours {
                    field: "pre/post",
                    value: record.pre_post.clone(),
                })?;
        // Pre/post on a kind without a buffer is ignored, not rejected
        let pre_post = if kind.has_buffer() {
            pre_post
        } else {
            Hours::ZERO
        };

        if !record.end.trim().is_empty() {
            let end = time::parse_clock("end", &record.end)?;
            return Self::with_end(date, start, end, kind, pre_post, record.note.clone());
        }
        if record.duration.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "end or duration",
            });
        }
        let duration: Hours =
            record
                .duration
                .parse()
                .map_err(|_| ValidationError::InvalidHours {
                    field: "duration",
                    value: record.duration.clone(),
                })?;
        Self::new(date, start, duration, kind, pre_post, record.note.clone())
    }
}

/// Converts a batch of records, skipping the ones that fail validation.
pub fn parse_records(records: &[ActivityRecord]) -> Vec<Activity> {
    records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| match Activity::try_from(record) {
            Ok(activity) => Some(activity),
            Err(err) => {
                tracing::warn!(
                    index = idx,
                    date = %record.date,
                    error = %err,
                    "skipping malformed activity record"
                );
                None
            }
        })
        .collect()
}
