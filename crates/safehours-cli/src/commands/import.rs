//! Import command for loading activities from CSV or JSON files.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use safehours_core::{Activity, ActivityRecord, check_overlap};
use safehours_db::{ActivityStore, Database};

use super::export::CsvRow;
use crate::cli::FileFormat;

/// Outcome counts of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows that could not be read or failed validation.
    pub skipped: usize,
    /// Valid rows that overlap an existing or earlier row.
    pub rejected: usize,
}

/// Reads CSV rows; unreadable rows are counted and skipped.
fn read_csv<R: Read>(reader: R) -> (Vec<ActivityRecord>, usize) {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();
    let mut skipped = 0;
    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) => records.push(row.into()),
            Err(err) => {
                tracing::warn!(line = idx + 2, error = %err, "skipping unreadable CSV row");
                skipped += 1;
            }
        }
    }
    (records, skipped)
}

/// Reads a JSON array of records; unreadable elements are counted and skipped.
fn read_json<R: Read>(reader: R) -> Result<(Vec<ActivityRecord>, usize)> {
    let values: Vec<serde_json::Value> =
        serde_json::from_reader(reader).context("expected a JSON array of activities")?;
    let mut records = Vec::new();
    let mut skipped = 0;
    for (idx, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<ActivityRecord>(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(index = idx, error = %err, "skipping unreadable JSON record");
                skipped += 1;
            }
        }
    }
    Ok((records, skipped))
}

/// Validates records and drops the ones that overlap `existing` or each other.
pub fn plan_import(
    records: &[ActivityRecord],
    existing: &[Activity],
) -> (Vec<Activity>, ImportSummary) {
    let mut accepted: Vec<Activity> = Vec::new();
    let mut summary = ImportSummary::default();
    for (idx, record) in records.iter().enumerate() {
        let activity = match Activity::try_from(record) {
            Ok(activity) => activity,
            Err(err) => {
                tracing::warn!(
                    index = idx,
                    date = %record.date,
                    error = %err,
                    "skipping invalid record"
                );
                summary.skipped += 1;
                continue;
            }
        };
        if let Err(err) = check_overlap(&activity, existing.iter().chain(accepted.iter())) {
            tracing::warn!(index = idx, error = %err, "rejecting overlapping record");
            summary.rejected += 1;
            continue;
        }
        accepted.push(activity);
    }
    summary.imported = accepted.len();
    (accepted, summary)
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    path: &Path,
    format: Option<FileFormat>,
    replace: bool,
) -> Result<ImportSummary> {
    let format = format.unwrap_or_else(|| FileFormat::from_path(path));
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let (records, unreadable) = match format {
        FileFormat::Csv => read_csv(reader),
        FileFormat::Json => read_json(reader)
            .with_context(|| format!("failed to read {}", path.display()))?,
    };

    let existing = if replace { Vec::new() } else { db.snapshot()? };
    let (accepted, mut summary) = plan_import(&records, &existing);
    summary.skipped += unreadable;

    if replace {
        db.replace_all(&accepted)
            .context("failed to replace activities")?;
    } else {
        db.insert_all(&accepted)
            .context("failed to store imported activities")?;
    }

    writeln!(
        writer,
        "Imported {} activities ({} skipped, {} overlapping)",
        summary.imported, summary.skipped, summary.rejected
    )?;
    Ok(summary)
}
