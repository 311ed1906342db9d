//! Status command: the daily warning panel.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use safehours_core::{Activity, DutyMetrics, MetricKind, Severity};

use super::util::{format_day, severity_marker};

/// One classified metric in JSON output.
#[derive(Debug, Serialize)]
pub struct JsonMetric {
    pub metric: MetricKind,
    pub label: &'static str,
    pub value: f64,
    pub severity: Severity,
}

/// JSON status structure.
#[derive(Debug, Serialize)]
pub struct JsonStatus {
    pub date: NaiveDate,
    pub metrics: Vec<JsonMetric>,
    pub overall: Severity,
}

fn metric_value(metrics: &DutyMetrics, kind: MetricKind) -> String {
    let hours = match kind {
        MetricKind::ConsecutiveDays => {
            let days = metrics.consecutive_days;
            return format!("{days} {}", if days == 1 { "day" } else { "days" });
        }
        MetricKind::FlightHours => metrics.flight_hours,
        MetricKind::ContactHours => metrics.contact_hours,
        MetricKind::DutyDay => metrics.duty_day,
        MetricKind::PastSevenDays => metrics.past_seven_days,
        MetricKind::RestHours => metrics.rest_hours,
    };
    format!("{hours:.1} h")
}

/// Formats the human-readable warning panel.
pub fn format_status(metrics: &DutyMetrics) -> Result<String> {
    use std::fmt::Write as _;

    let mut output = String::new();
    writeln!(output, "DUTY STATUS: {}", format_day(metrics.date))?;
    writeln!(output)?;
    for (kind, severity) in metrics.severities() {
        writeln!(
            output,
            "{} {:<17} {:>9}  {}",
            severity_marker(severity),
            kind.label(),
            metric_value(metrics, kind),
            severity
        )?;
    }
    writeln!(output)?;
    writeln!(output, "Overall: {}", metrics.overall())?;
    Ok(output)
}

/// Formats the status as JSON.
pub fn format_status_json(metrics: &DutyMetrics) -> Result<String> {
    let status = JsonStatus {
        date: metrics.date,
        metrics: metrics
            .severities()
            .into_iter()
            .map(|(kind, severity)| JsonMetric {
                metric: kind,
                label: kind.label(),
                value: metrics.value(kind),
                severity,
            })
            .collect(),
        overall: metrics.overall(),
    };
    Ok(serde_json::to_string_pretty(&status)?)
}

pub fn run<W: Write>(
    writer: &mut W,
    activities: &[Activity],
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let metrics = DutyMetrics::compute(activities, date);
    if json {
        writeln!(writer, "{}", format_status_json(&metrics)?)?;
    } else {
        write!(writer, "{}", format_status(&metrics)?)?;
    }
    Ok(())
}
