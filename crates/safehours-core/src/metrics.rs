//! Daily duty metrics relative to a reference date.
//!
//! Every calculator is a pure function of `(activities, date)`. Input order
//! does not matter and an empty window yields zero.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::activity::{Activity, ActivityKind};
use crate::severity::{MetricKind, Severity, classify};
use crate::time;
use crate::types::Hours;

/// Length of the rolling hour window, in days.
pub const ROLLING_WINDOW_DAYS: u64 = 7;

fn on_date(activities: &[Activity], date: NaiveDate) -> impl Iterator<Item = &Activity> {
    activities.iter().filter(move |a| a.date == date)
}

/// Flight duration on `date`, without buffer time.
pub fn flight_hours(activities: &[Activity], date: NaiveDate) -> Hours {
    on_date(activities, date)
        .filter(|a| a.kind == ActivityKind::Flight)
        .map(Activity::duration)
        .sum()
}

/// Flight, SIM/ATD and ground duration on `date`, plus buffers where they apply.
pub fn contact_hours(activities: &[Activity], date: NaiveDate) -> Hours {
    on_date(activities, date)
        .filter(|a| a.kind.is_contact())
        .map(Activity::contact_time)
        .sum()
}

/// Span from the earliest adjusted start to the latest adjusted end on `date`.
pub fn duty_day(activities: &[Activity], date: NaiveDate) -> Hours {
    let mut day = on_date(activities, date);
    let Some(first) = day.next() else {
        return Hours::ZERO;
    };
    let (start, end) = day.fold((first.adjusted_start(), first.adjusted_end()), |(s, e), a| {
        (s.min(a.adjusted_start()), e.max(a.adjusted_end()))
    });
    Hours::from_duration(end - start).non_negative()
}

/// Gap between the last adjusted end on the previous day and the first
/// adjusted start on `date`.
///
/// Zero when either day has no activity.
pub fn rest_hours(activities: &[Activity], date: NaiveDate) -> Hours {
    let Some(previous) = time::previous_day(date) else {
        return Hours::ZERO;
    };
    let last_end = on_date(activities, previous).map(Activity::adjusted_end).max();
    let first_start = on_date(activities, date).map(Activity::adjusted_start).min();
    match (last_end, first_start) {
        (Some(end), Some(start)) => Hours::from_duration(start - end).non_negative(),
        _ => Hours::ZERO,
    }
}

/// Sum of duration plus buffer for counted kinds over `[start, end]`.
pub(crate) fn window_total(activities: &[Activity], start: NaiveDate, end: NaiveDate) -> Hours {
    activities
        .iter()
        .filter(|a| a.date >= start && a.date <= end && a.kind.counts_toward_totals())
        .map(Activity::contact_time)
        .sum()
}

/// Hours over the seven days ending at `date`, inclusive.
pub fn past_seven_days(activities: &[Activity], date: NaiveDate) -> Hours {
    window_total(activities, time::window_start(date, ROLLING_WINDOW_DAYS), date)
}

/// Number of consecutive days ending at `date` that each have an activity.
pub fn consecutive_days(activities: &[Activity], date: NaiveDate) -> u32 {
    let active: HashSet<NaiveDate> = activities.iter().map(|a| a.date).collect();
    let mut streak = 0;
    let mut day = Some(date);
    while let Some(current) = day {
        if !active.contains(&current) {
            break;
        }
        streak += 1;
        day = time::previous_day(current);
    }
    streak
}

/// All six daily metrics for one reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DutyMetrics {
    pub date: NaiveDate,
    pub flight_hours: Hours,
    pub contact_hours: Hours,
    pub duty_day: Hours,
    pub rest_hours: Hours,
    pub past_seven_days: Hours,
    pub consecutive_days: u32,
}

impl DutyMetrics {
    pub fn compute(activities: &[Activity], date: NaiveDate) -> Self {
        let metrics = Self {
            date,
            flight_hours: flight_hours(activities, date),
            contact_hours: contact_hours(activities, date),
            duty_day: duty_day(activities, date),
            rest_hours: rest_hours(activities, date),
            past_seven_days: past_seven_days(activities, date),
            consecutive_days: consecutive_days(activities, date),
        };
        tracing::debug!(?metrics, activities = activities.len(), "computed duty metrics");
        metrics
    }

    /// The value the classifier sees for a metric.
    pub fn value(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::FlightHours => self.flight_hours.as_f64(),
            MetricKind::ContactHours => self.contact_hours.as_f64(),
            MetricKind::ConsecutiveDays => f64::from(self.consecutive_days),
            MetricKind::DutyDay => self.duty_day.as_f64(),
            MetricKind::PastSevenDays => self.past_seven_days.as_f64(),
            MetricKind::RestHours => self.rest_hours.as_f64(),
        }
    }

    pub fn severity(&self, kind: MetricKind) -> Severity {
        classify(kind, self.value(kind))
    }

    /// Severity of every metric, in panel order.
    pub fn severities(&self) -> Vec<(MetricKind, Severity)> {
        MetricKind::ALL
            .into_iter()
            .map(|kind| (kind, self.severity(kind)))
            .collect()
    }

    /// The most severe level across all metrics.
    pub fn overall(&self) -> Severity {
        MetricKind::ALL
            .into_iter()
            .map(|kind| self.severity(kind))
            .max()
            .unwrap_or(Severity::Normal)
    }
}
