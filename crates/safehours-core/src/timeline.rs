//! Per-day timeline segments for rendering.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::activity::{Activity, ActivityKind};
use crate::types::Hours;

/// What a stretch of the timeline represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "segment", content = "activity", rename_all = "lowercase")]
pub enum SegmentKind {
    Pre,
    Core(ActivityKind),
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSegment {
    pub kind: SegmentKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimelineSegment {
    pub fn length(&self) -> Hours {
        Hours::from_duration(self.end - self.start).non_negative()
    }
}

/// Pre, core and post segments for every activity on `date`, ordered by start.
///
/// Pre segments can begin on the previous day when the buffer reaches past
/// midnight.
pub fn day_timeline(activities: &[Activity], date: NaiveDate) -> Vec<TimelineSegment> {
    let mut segments = Vec::new();
    for activity in activities.iter().filter(|a| a.date == date) {
        let start = activity.start_instant();
        let end = activity.end_instant();
        if !activity.buffer().is_zero() {
            segments.push(TimelineSegment {
                kind: SegmentKind::Pre,
                start: activity.adjusted_start(),
                end: start,
            });
        }
        segments.push(TimelineSegment {
            kind: SegmentKind::Core(activity.kind),
            start,
            end,
        });
        if !activity.buffer().is_zero() {
            segments.push(TimelineSegment {
                kind: SegmentKind::Post,
                start: end,
                end: activity.adjusted_end(),
            });
        }
    }
    segments.sort_by_key(|s| (s.start, s.end));
    segments
}
