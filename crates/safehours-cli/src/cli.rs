//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};

use safehours_core::{ActivityKind, Hours};

use crate::commands::util::{parse_clock_arg, parse_date_arg};

/// Crew duty-time tracker.
///
/// Records flight, simulator, ground and other scheduled activities and
/// reports duty limits against fixed caution and warning thresholds.
#[derive(Debug, Parser)]
#[command(name = "safehours", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a new activity.
    Add {
        /// Activity date (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Start time (HH:MM).
        #[arg(long, value_parser = parse_clock_arg)]
        start: NaiveTime,

        /// Duration in decimal hours (e.g. 1.5).
        #[arg(long, conflicts_with = "end", required_unless_present = "end")]
        duration: Option<Hours>,

        /// End time (HH:MM) on the same date.
        #[arg(long, value_parser = parse_clock_arg)]
        end: Option<NaiveTime>,

        /// Activity kind: Flight, SIM/ATD, Ground or "Other Sched. Act.".
        #[arg(long)]
        kind: ActivityKind,

        /// Pre/post buffer in decimal hours, split evenly around the activity.
        #[arg(long, default_value = "0")]
        pre_post: Hours,

        /// Free-text note.
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Change fields of an existing activity.
    Edit {
        /// Activity ID or unique prefix.
        id: String,

        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        #[arg(long, value_parser = parse_clock_arg)]
        start: Option<NaiveTime>,

        #[arg(long, value_parser = parse_clock_arg, conflicts_with = "duration")]
        end: Option<NaiveTime>,

        /// New duration in decimal hours; the start time is kept.
        #[arg(long)]
        duration: Option<Hours>,

        #[arg(long)]
        kind: Option<ActivityKind>,

        #[arg(long)]
        pre_post: Option<Hours>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Remove an activity.
    Delete {
        /// Activity ID or unique prefix.
        id: String,
    },

    /// List recorded activities, newest first.
    List {
        /// Only show activities on this date.
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show duty metrics and their severities for a day.
    Status {
        /// Reference date. Defaults to today.
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the Sunday-to-Saturday breakdown containing a date.
    Week {
        /// Any date in the week. Defaults to today.
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Draw the pre, core and post segments of a day.
    Timeline {
        /// Day to draw. Defaults to today.
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Write all activities as CSV or JSON.
    Export {
        #[arg(long, value_enum, default_value_t = FileFormat::Csv)]
        format: FileFormat,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load activities from a CSV or JSON file.
    Import {
        /// File to read.
        path: PathBuf,

        /// File format. Inferred from the extension when omitted.
        #[arg(long, value_enum)]
        format: Option<FileFormat>,

        /// Replace all stored activities instead of adding to them.
        #[arg(long)]
        replace: bool,
    },
}

/// Interchange file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    /// Guesses the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_requires_duration_or_end() {
        let err = Cli::try_parse_from([
            "safehours", "add", "--start", "08:00", "--kind", "Flight",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn add_parses_kind_alias_and_hours() {
        let cli = Cli::try_parse_from([
            "safehours",
            "add",
            "--date",
            "2024-06-10",
            "--start",
            "08:00",
            "--duration",
            "1.5",
            "--kind",
            "sim",
            "--pre-post",
            "0.5",
        ])
        .unwrap();
        let Some(Commands::Add {
            kind,
            duration,
            pre_post,
            ..
        }) = cli.command
        else {
            panic!("expected add command");
        };
        assert_eq!(kind, ActivityKind::SimAtd);
        assert_eq!(duration, Some(Hours::from_minutes(90)));
        assert_eq!(pre_post, Hours::from_minutes(30));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            FileFormat::from_path(std::path::Path::new("log.JSON")),
            FileFormat::Json
        );
        assert_eq!(
            FileFormat::from_path(std::path::Path::new("log.csv")),
            FileFormat::Csv
        );
        assert_eq!(
            FileFormat::from_path(std::path::Path::new("log")),
            FileFormat::Csv
        );
    }
}
