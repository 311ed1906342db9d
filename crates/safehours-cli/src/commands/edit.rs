//! Edit and delete commands for stored activities.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime};

use safehours_core::time::end_after;
use safehours_core::validation::displayed_duration;
use safehours_core::{
    Activity, ActivityEdit, ActivityKind, Hours, ValidationError, apply_edits, check_overlap,
};
use safehours_db::{ActivityStore, Database};

/// Requested field changes; `None` leaves a field as stored.
#[derive(Debug, Clone, Default)]
pub struct EditArgs {
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub duration: Option<Hours>,
    pub kind: Option<ActivityKind>,
    pub pre_post: Option<Hours>,
    pub note: Option<String>,
}

impl EditArgs {
    /// Orders the changes so each intermediate record stays valid.
    ///
    /// A new start paired with a duration is turned into a start and end. A
    /// new start at or after the current end is applied after the new end,
    /// otherwise before it.
    fn into_edits(self, current: &Activity) -> Result<Vec<ActivityEdit>, ValidationError> {
        let mut edits = Vec::new();
        if let Some(date) = self.date {
            edits.push(ActivityEdit::Date(date));
        }
        let (end, duration) = match (self.start, self.end, self.duration) {
            (Some(start), None, Some(duration)) => {
                let date = self.date.unwrap_or(current.date);
                (Some(end_after(date, start, duration)?), None)
            }
            (_, end, duration) => (end, duration),
        };
        match (self.start, end) {
            (Some(start), Some(end)) if start >= current.end => {
                edits.push(ActivityEdit::End(end));
                edits.push(ActivityEdit::Start(start));
            }
            (start, end) => {
                edits.extend(start.map(ActivityEdit::Start));
                edits.extend(end.map(ActivityEdit::End));
            }
        }
        edits.extend(duration.map(ActivityEdit::Duration));
        edits.extend(self.kind.map(ActivityEdit::Kind));
        edits.extend(self.pre_post.map(ActivityEdit::PrePost));
        edits.extend(self.note.map(ActivityEdit::Note));
        Ok(edits)
    }
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, id: &str, args: EditArgs) -> Result<()> {
    let id = db.resolve_id(id)?;
    let stored = db
        .get_activity(&id)?
        .with_context(|| format!("activity {id} disappeared"))?;

    let edits = args
        .into_edits(&stored.activity)
        .context("invalid edit")?;
    if edits.is_empty() {
        bail!("nothing to change; pass at least one field to edit");
    }
    let edited = apply_edits(&stored.activity, edits).context("invalid edit")?;

    let others: Vec<_> = db
        .list_activities()?
        .into_iter()
        .filter(|other| other.id != id)
        .map(|other| other.activity)
        .collect();
    check_overlap(&edited, &others).context("edit rejected")?;

    db.replace_activity(&id, &edited)
        .context("failed to store edit")?;
    writeln!(
        writer,
        "Updated {} {} {}-{} ({} h)",
        id.short(),
        edited.kind,
        edited.start.format("%H:%M"),
        edited.end.format("%H:%M"),
        displayed_duration(&edited)
    )?;
    Ok(())
}

pub fn delete<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let id = db.resolve_id(id)?;
    db.delete_activity(&id)
        .context("failed to delete activity")?;
    writeln!(writer, "Deleted {}", id.short())?;
    Ok(())
}
