//! Add command for recording a new activity.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};

use safehours_core::{Activity, ActivityId, ActivityKind, Hours, ValidationError, validate_new};
use safehours_db::ActivityStore;

/// Fields of the `add` command after argument parsing.
#[derive(Debug, Clone)]
pub struct AddArgs {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub duration: Option<Hours>,
    pub end: Option<NaiveTime>,
    pub kind: ActivityKind,
    pub pre_post: Hours,
    pub note: String,
}

impl AddArgs {
    /// Builds the activity, preferring an explicit end over a duration.
    pub fn to_activity(&self) -> Result<Activity, ValidationError> {
        match (self.end, self.duration) {
            (Some(end), _) => Activity::with_end(
                self.date,
                self.start,
                end,
                self.kind,
                self.pre_post,
                self.note.clone(),
            ),
            (None, Some(duration)) => Activity::new(
                self.date,
                self.start,
                duration,
                self.kind,
                self.pre_post,
                self.note.clone(),
            ),
            (None, None) => Err(ValidationError::Empty {
                field: "end or duration",
            }),
        }
    }
}

pub fn run<W: Write, S: ActivityStore>(
    writer: &mut W,
    store: &mut S,
    args: &AddArgs,
) -> Result<ActivityId> {
    let activity = args.to_activity().context("invalid activity")?;
    let existing = store.snapshot().context("failed to load activities")?;
    validate_new(&activity, &existing).context("activity rejected")?;

    let id = store
        .insert_activity(&activity)
        .context("failed to store activity")?;
    writeln!(
        writer,
        "Added {} {} {}-{} ({} h)",
        id.short(),
        activity.kind,
        activity.start.format("%H:%M"),
        activity.end.format("%H:%M"),
        activity.duration()
    )?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    use safehours_db::Database;

    fn args(start: (u32, u32), duration_min: i64) -> AddArgs {
        AddArgs {
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            duration: Some(Hours::from_minutes(duration_min)),
            end: None,
            kind: ActivityKind::Flight,
            pre_post: Hours::from_minutes(60),
            note: "KSEA-KPDX".to_string(),
        }
    }

    #[test]
    fn add_stores_activity_and_reports_it() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let id = run(&mut output, &mut db, &args((8, 0), 240)).unwrap();

        let stored = db.get_activity(&id).unwrap().unwrap();
        assert_eq!(stored.activity.end, NaiveTime::from_hms_opt(12, 0, 0).unwrap());

        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            format!("Added {} Flight 08:00-12:00 (4.0 h)\n", id.short())
        );
    }

    #[test]
    fn add_rejects_overlap() {
        let mut db = Database::open_in_memory().unwrap();
        run(&mut Vec::new(), &mut db, &args((8, 0), 240)).unwrap();

        let err = run(&mut Vec::new(), &mut db, &args((11, 0), 60)).unwrap_err();
        assert!(format!("{err:#}").contains("overlaps"));
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn add_rejects_past_midnight() {
        let mut db = Database::open_in_memory().unwrap();
        let err = run(&mut Vec::new(), &mut db, &args((22, 0), 180)).unwrap_err();
        assert!(err.to_string().contains("invalid activity"));
    }

    #[test]
    fn explicit_end_wins_over_duration() {
        let mut a = args((8, 0), 60);
        a.end = Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(a.to_activity().unwrap().duration(), Hours::from_minutes(120));
    }
}
