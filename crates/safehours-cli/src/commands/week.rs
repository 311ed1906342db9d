//! Week command: the Sunday-to-Saturday breakdown.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;

use safehours_core::{Activity, Category, WeeklySummary, weekly_summary};

use super::util::{hours_cell, progress_bar};

const CELL: usize = 8;

const fn column_label(category: Category) -> &'static str {
    match category {
        Category::OtherScheduled => "Other",
        other => other.label(),
    }
}

/// Formats the weekly table with a bar per day.
pub fn format_week(summary: &WeeklySummary) -> Result<String> {
    use std::fmt::Write as _;

    let mut output = String::new();
    writeln!(
        output,
        "WEEK: {} - {}",
        summary.week_start.format("%a %b %-d"),
        summary.week_end.format("%a %b %-d, %Y")
    )?;
    writeln!(output)?;

    write!(output, "{:<9}", "Day")?;
    for category in Category::ALL {
        write!(output, " {:>CELL$}", column_label(category))?;
    }
    writeln!(output, " {:>CELL$}", "Total")?;

    let max = summary
        .days
        .iter()
        .map(|d| d.totals.counted_total())
        .max()
        .unwrap_or_default();
    for day in &summary.days {
        write!(output, "{}", day.date.format("%a %m-%d"))?;
        for category in Category::ALL {
            write!(output, " {}", hours_cell(day.totals.get(category), CELL))?;
        }
        let total = day.totals.counted_total();
        writeln!(
            output,
            " {}  {}",
            hours_cell(total, CELL),
            progress_bar(total, max)
        )?;
    }

    write!(output, "{:<9}", "Total")?;
    for category in Category::ALL {
        write!(output, " {}", hours_cell(summary.totals.get(category), CELL))?;
    }
    writeln!(output, " {}", hours_cell(summary.total_hours, CELL))?;

    writeln!(output)?;
    writeln!(output, "Active days:   {}", summary.active_days)?;
    writeln!(output, "Daily average: {:.1} h", summary.daily_average)?;
    writeln!(output, "7-day change:  {:+.1}%", summary.percent_change)?;
    Ok(output)
}

pub fn run<W: Write>(
    writer: &mut W,
    activities: &[Activity],
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let summary = weekly_summary(activities, date);
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        write!(writer, "{}", format_week(&summary)?)?;
    }
    Ok(())
}
