//! Engine scenarios over whole activity histories.

use chrono::{Days, NaiveDate, NaiveTime};
use safehours_core::metrics::{consecutive_days, contact_hours, flight_hours, rest_hours};
use safehours_core::{
    Activity, ActivityEdit, ActivityKind, ActivityRecord, DutyMetrics, Hours, MetricKind, Severity,
    apply_edits, parse_records, weekly_summary,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn window(d: NaiveDate, start: NaiveTime, end: NaiveTime, kind: ActivityKind) -> Activity {
    buffered(d, start, end, kind, Hours::ZERO)
}

fn buffered(
    d: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    kind: ActivityKind,
    pre_post: Hours,
) -> Activity {
    Activity::with_end(d, start, end, kind, pre_post, "").unwrap()
}

fn single_flight() -> Vec<Activity> {
    parse_records(&[ActivityRecord {
        date: "2024-06-10".to_string(),
        start: "08:00".to_string(),
        end: "12:00".to_string(),
        activity: "Flight".to_string(),
        pre_post: "1.0".to_string(),
        ..ActivityRecord::default()
    }])
}

#[test]
fn single_flight_day_metrics() {
    let acts = single_flight();
    let metrics = DutyMetrics::compute(&acts, date("2024-06-10"));
    assert_eq!(metrics.flight_hours, Hours::from_minutes(240));
    assert_eq!(metrics.contact_hours, Hours::from_minutes(300));
    assert_eq!(metrics.duty_day, Hours::from_minutes(300));
    assert_eq!(metrics.past_seven_days, Hours::from_minutes(300));
    assert_eq!(metrics.consecutive_days, 1);
}

#[test]
fn day_after_only_activity_has_zero_rest() {
    let acts = single_flight();
    let metrics = DutyMetrics::compute(&acts, date("2024-06-11"));
    assert_eq!(metrics.rest_hours, Hours::ZERO);
    assert_eq!(metrics.consecutive_days, 0);
    assert_eq!(metrics.severity(MetricKind::RestHours), Severity::Caution);
}

#[test]
fn empty_history_is_all_zero() {
    let d = date("2024-06-10");
    let metrics = DutyMetrics::compute(&[], d);
    assert_eq!(metrics.flight_hours, Hours::ZERO);
    assert_eq!(metrics.contact_hours, Hours::ZERO);
    assert_eq!(metrics.duty_day, Hours::ZERO);
    assert_eq!(metrics.past_seven_days, Hours::ZERO);
    assert_eq!(metrics.consecutive_days, 0);

    let week = weekly_summary(&[], d);
    assert_eq!(week.daily_average, Hours::ZERO);
    assert!(week.percent_change.abs() < f64::EPSILON);
    assert_eq!(week.days.len(), 7);
}

#[test]
fn seven_day_streak_not_extended_past_gap() {
    let first = date("2024-06-04");
    let mut acts: Vec<Activity> = (0..7)
        .map(|offset| {
            Activity::with_end(
                first.checked_add_days(Days::new(offset)).unwrap(),
                time(9, 0),
                time(10, 0),
                ActivityKind::Ground,
                Hours::ZERO,
                "",
            )
            .unwrap()
        })
        .collect();
    // A day of activity before the empty 2024-06-03
    acts.push(window(date("2024-06-02"), time(9, 0), time(10, 0), ActivityKind::Flight));
    assert_eq!(consecutive_days(&acts, date("2024-06-10")), 7);
    assert_eq!(consecutive_days(&acts, date("2024-06-11")), 0);
}

#[test]
fn contact_hours_never_below_flight_hours() {
    let d = date("2024-06-10");
    let acts = vec![
        buffered(d, time(6, 0), time(7, 0), ActivityKind::Flight, Hours::from_minutes(30)),
        window(d, time(8, 0), time(9, 0), ActivityKind::Ground),
        window(d, time(10, 0), time(13, 0), ActivityKind::Flight),
        window(d, time(14, 0), time(15, 0), ActivityKind::OtherScheduled),
    ];
    assert!(contact_hours(&acts, d) >= flight_hours(&acts, d));
}

#[test]
fn percent_change_zero_without_prior_window() {
    let acts = single_flight();
    for day in ["2024-06-10", "2024-06-12", "2024-06-16"] {
        let summary = weekly_summary(&acts, date(day));
        assert!(summary.percent_change.abs() < f64::EPSILON, "nonzero change for {day}");
    }
}

#[test]
fn week_total_consistent_with_days() {
    let acts = parse_records(&[
        ActivityRecord {
            date: "2024-06-09".to_string(),
            start: "07:00".to_string(),
            duration: "3.5".to_string(),
            activity: "SIM/ATD".to_string(),
            pre_post: "1.5".to_string(),
            ..ActivityRecord::default()
        },
        ActivityRecord {
            date: "2024-06-13".to_string(),
            start: "22:00".to_string(),
            end: "23:59".to_string(),
            activity: "Flight".to_string(),
            pre_post: "0.5".to_string(),
            ..ActivityRecord::default()
        },
        ActivityRecord {
            date: "2024-06-14".to_string(),
            start: "10:00".to_string(),
            end: "11:00".to_string(),
            activity: "Other Sched. Act.".to_string(),
            ..ActivityRecord::default()
        },
    ]);
    assert_eq!(acts.len(), 3);
    let summary = weekly_summary(&acts, date("2024-06-11"));
    let by_day: Hours = summary.days.iter().map(|d| d.totals.counted_total()).sum();
    assert_eq!(summary.total_hours, by_day);
    // 3.5 + 1.5 + 1h59m + 0.5
    assert_eq!(summary.total_hours, Hours::from_minutes(210 + 90 + 119 + 30));
    assert_eq!(summary.active_days, 2);
}

#[test]
fn rest_across_midnight_buffer() {
    let acts = vec![
        buffered(
            date("2024-06-09"),
            time(20, 0),
            time(23, 0),
            ActivityKind::Flight,
            Hours::from_minutes(60),
        ),
        window(date("2024-06-10"), time(9, 0), time(10, 0), ActivityKind::Ground),
    ];
    // 23:30 to 09:00
    assert_eq!(rest_hours(&acts, date("2024-06-10")), Hours::from_minutes(570));
}

#[test]
fn edit_roundtrip_keeps_elapsed_hours() {
    let original = single_flight().remove(0);
    let edited = apply_edits(
        &original,
        [ActivityEdit::End(time(13, 45)), ActivityEdit::Start(time(9, 15))],
    )
    .unwrap();
    assert_eq!(edited.duration(), Hours::from_minutes(270));
    let back = apply_edits(
        &edited,
        [ActivityEdit::Start(time(8, 0)), ActivityEdit::End(time(12, 0))],
    )
    .unwrap();
    assert_eq!(back.duration(), original.duration());
    assert_eq!(back, original);
}
