//! Write-boundary checks for creating and editing activities.
//!
//! The calculators assume validated input. Hosts run these before storing a
//! new or edited record.

use chrono::{NaiveDate, NaiveTime};

use crate::activity::{Activity, ActivityKind};
use crate::types::{Hours, ValidationError};

/// A single field change to an existing activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEdit {
    Date(NaiveDate),
    /// Keeps the end time; duration is re-derived.
    Start(NaiveTime),
    /// Keeps the start time; duration is re-derived.
    End(NaiveTime),
    /// Keeps the start time; the end moves.
    Duration(Hours),
    Kind(ActivityKind),
    PrePost(Hours),
    Note(String),
}

/// Applies one edit, returning the replacement record.
///
/// Overlap with other records is not checked here; follow up with
/// [`check_overlap`] against the rest of the collection.
pub fn apply_edit(original: &Activity, edit: ActivityEdit) -> Result<Activity, ValidationError> {
    let a = original;
    match edit {
        ActivityEdit::Date(date) => {
            Activity::with_end(date, a.start, a.end, a.kind, a.pre_post, a.note.clone())
        }
        ActivityEdit::Start(start) => {
            Activity::with_end(a.date, start, a.end, a.kind, a.pre_post, a.note.clone())
        }
        ActivityEdit::End(end) => {
            Activity::with_end(a.date, a.start, end, a.kind, a.pre_post, a.note.clone())
        }
        ActivityEdit::Duration(duration) => {
            Activity::new(a.date, a.start, duration, a.kind, a.pre_post, a.note.clone())
        }
        ActivityEdit::Kind(kind) => {
            Activity::with_end(a.date, a.start, a.end, kind, a.pre_post, a.note.clone())
        }
        ActivityEdit::PrePost(pre_post) => {
            Activity::with_end(a.date, a.start, a.end, a.kind, pre_post, a.note.clone())
        }
        ActivityEdit::Note(note) => {
            Activity::with_end(a.date, a.start, a.end, a.kind, a.pre_post, note)
        }
    }
}

/// Applies several edits in order, stopping at the first failure.
pub fn apply_edits(
    original: &Activity,
    edits: impl IntoIterator<Item = ActivityEdit>,
) -> Result<Activity, ValidationError> {
    edits
        .into_iter()
        .try_fold(original.clone(), |current, edit| apply_edit(&current, edit))
}

/// Rejects a candidate whose core window intersects any existing record.
///
/// Pass the collection without the record being edited.
pub fn check_overlap<'a>(
    candidate: &Activity,
    existing: impl IntoIterator<Item = &'a Activity>,
) -> Result<(), ValidationError> {
    match existing.into_iter().find(|other| candidate.overlaps(other)) {
        Some(other) => Err(ValidationError::Overlap {
            date: other.date,
            start: other.start,
            end: other.end,
        }),
        None => Ok(()),
    }
}

/// Full check for a new record: invariants plus overlap.
pub fn validate_new<'a>(
    candidate: &Activity,
    existing: impl IntoIterator<Item = &'a Activity>,
) -> Result<(), ValidationError> {
    let revalidated = Activity::with_end(
        candidate.date,
        candidate.start,
        candidate.end,
        candidate.kind,
        candidate.pre_post,
        candidate.note.clone(),
    )?;
    check_overlap(&revalidated, existing)
}

/// Duration shown after an edit, rounded to one decimal like the edit form.
pub fn displayed_duration(activity: &Activity) -> String {
    format!("{:.1}", activity.duration())
}
