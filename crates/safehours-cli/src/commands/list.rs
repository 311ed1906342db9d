//! List command for browsing stored activities.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use safehours_core::ActivityRecord;
use safehours_core::weekly::kind_totals;
use safehours_db::{ActivityStore, StoredActivity};

use super::util::{format_duration, hours_cell, progress_bar};

/// One activity in JSON output.
#[derive(Debug, Serialize)]
pub struct JsonActivity {
    pub id: String,
    #[serde(flatten)]
    pub record: ActivityRecord,
}

fn format_list(activities: &[StoredActivity]) -> Result<String> {
    use std::fmt::Write as _;

    let mut output = String::new();
    if activities.is_empty() {
        writeln!(output, "No activities recorded.")?;
        return Ok(output);
    }

    for stored in activities {
        let a = &stored.activity;
        let mut extras = String::new();
        if !a.buffer().is_zero() {
            write!(extras, "  P/P {:.1}", a.buffer())?;
        }
        if !a.note.is_empty() {
            write!(extras, "  {}", a.note)?;
        }
        let kind = if extras.is_empty() {
            a.kind.as_str().to_string()
        } else {
            format!("{:<17}", a.kind.as_str())
        };
        writeln!(
            output,
            "{}  {}  {}-{}  {} h  {kind}{extras}",
            stored.id.short(),
            a.date,
            a.start.format("%H:%M"),
            a.end.format("%H:%M"),
            hours_cell(a.duration(), 5),
        )?;
    }

    let plain: Vec<_> = activities.iter().map(|s| s.activity.clone()).collect();
    let totals = kind_totals(&plain);
    let max = totals.iter().map(|(_, hours)| *hours).max().unwrap_or_default();
    writeln!(output)?;
    writeln!(output, "BY ACTIVITY")?;
    writeln!(output, "───────────")?;
    for (kind, hours) in totals {
        writeln!(
            output,
            "{:<17} {:>8}  {}",
            kind.as_str(),
            format_duration(hours),
            progress_bar(hours, max)
        )?;
    }
    Ok(output)
}

fn format_list_json(activities: &[StoredActivity]) -> Result<String> {
    let entries: Vec<_> = activities
        .iter()
        .map(|stored| JsonActivity {
            id: stored.id.to_string(),
            record: stored.activity.to_record(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

pub fn run<W: Write, S: ActivityStore>(
    writer: &mut W,
    store: &S,
    date: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let mut activities = store.list_activities()?;
    if let Some(date) = date {
        activities.retain(|stored| stored.activity.date == date);
    }

    if json {
        writeln!(writer, "{}", format_list_json(&activities)?)?;
    } else {
        write!(writer, "{}", format_list(&activities)?)?;
    }
    Ok(())
}
