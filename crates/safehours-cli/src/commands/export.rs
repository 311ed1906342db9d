//! Export command for writing activities as CSV or JSON.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use safehours_core::{Activity, ActivityRecord};

use crate::cli::FileFormat;

/// One CSV row. Column names follow the log sheet headings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Strt")]
    pub start: String,
    #[serde(rename = "End", default)]
    pub end: String,
    #[serde(rename = "Dur", default)]
    pub duration: String,
    #[serde(rename = "P/P", default)]
    pub pre_post: String,
    #[serde(rename = "Act")]
    pub activity: String,
    #[serde(rename = "Note", default)]
    pub note: String,
}

impl From<ActivityRecord> for CsvRow {
    fn from(record: ActivityRecord) -> Self {
        Self {
            date: record.date,
            start: record.start,
            end: record.end,
            duration: record.duration,
            pre_post: record.pre_post,
            activity: record.activity,
            note: record.note,
        }
    }
}

impl From<CsvRow> for ActivityRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            date: row.date,
            start: row.start,
            end: row.end,
            duration: row.duration,
            activity: row.activity,
            pre_post: row.pre_post,
            note: row.note,
        }
    }
}

/// Activities in chronological order as interchange records.
fn to_records(activities: &[Activity]) -> Vec<ActivityRecord> {
    let mut sorted: Vec<&Activity> = activities.iter().collect();
    sorted.sort_by_key(|a| (a.date, a.start, a.end));
    sorted.into_iter().map(Activity::to_record).collect()
}

pub fn write_csv<W: Write>(writer: W, activities: &[Activity]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in to_records(activities) {
        writer.serialize(CsvRow::from(record))?;
    }
    // An empty export still gets a header row
    if activities.is_empty() {
        writer.write_record(["Date", "Strt", "End", "Dur", "P/P", "Act", "Note"])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(mut writer: W, activities: &[Activity]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &to_records(activities))?;
    writeln!(writer)?;
    Ok(())
}

pub fn run(activities: &[Activity], format: FileFormat, output: Option<&Path>) -> Result<()> {
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };
    match format {
        FileFormat::Csv => write_csv(writer, activities),
        FileFormat::Json => write_json(writer, activities),
    }?;
    tracing::debug!(count = activities.len(), ?format, "exported activities");
    Ok(())
}
