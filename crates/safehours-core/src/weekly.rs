//! Calendar-week aggregation (Sunday through Saturday).

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::activity::{Activity, ActivityKind};
use crate::metrics::{ROLLING_WINDOW_DAYS, window_total};
use crate::time;
use crate::types::Hours;

/// Breakdown buckets: the four activity kinds plus accumulated buffer time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Flight,
    SimAtd,
    Ground,
    OtherScheduled,
    PrePost,
}

impl Category {
    pub const ALL: [Self; 5] = [
        Self::Flight,
        Self::SimAtd,
        Self::Ground,
        Self::OtherScheduled,
        Self::PrePost,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Flight => "Flight",
            Self::SimAtd => "SIM/ATD",
            Self::Ground => "Ground",
            Self::OtherScheduled => "Other Sched. Act.",
            Self::PrePost => "Pre/Post",
        }
    }

    /// Whether the bucket counts toward week totals and averages.
    pub const fn is_counted(self) -> bool {
        !matches!(self, Self::OtherScheduled)
    }
}

impl From<ActivityKind> for Category {
    fn from(kind: ActivityKind) -> Self {
        match kind {
            ActivityKind::Flight => Self::Flight,
            ActivityKind::SimAtd => Self::SimAtd,
            ActivityKind::Ground => Self::Ground,
            ActivityKind::OtherScheduled => Self::OtherScheduled,
        }
    }
}

/// Hours per breakdown category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub flight: Hours,
    pub sim_atd: Hours,
    pub ground: Hours,
    pub other_scheduled: Hours,
    pub pre_post: Hours,
}

impl CategoryTotals {
    pub const fn get(&self, category: Category) -> Hours {
        match category {
            Category::Flight => self.flight,
            Category::SimAtd => self.sim_atd,
            Category::Ground => self.ground,
            Category::OtherScheduled => self.other_scheduled,
            Category::PrePost => self.pre_post,
        }
    }

    pub fn add(&mut self, category: Category, hours: Hours) {
        let slot = match category {
            Category::Flight => &mut self.flight,
            Category::SimAtd => &mut self.sim_atd,
            Category::Ground => &mut self.ground,
            Category::OtherScheduled => &mut self.other_scheduled,
            Category::PrePost => &mut self.pre_post,
        };
        *slot += hours;
    }

    /// Adds an activity's duration to its kind and its buffer to pre/post.
    pub fn add_activity(&mut self, activity: &Activity) {
        self.add(activity.kind.into(), activity.duration());
        if activity.kind.has_buffer() {
            self.add(Category::PrePost, activity.buffer());
        }
    }

    /// Flight + SIM/ATD + Ground + Pre/Post.
    pub fn counted_total(&self) -> Hours {
        Category::ALL
            .into_iter()
            .filter(|c| c.is_counted())
            .map(|c| self.get(c))
            .sum()
    }

    /// Whether any counted bucket is non-zero.
    pub fn is_active(&self) -> bool {
        Category::ALL
            .into_iter()
            .any(|c| c.is_counted() && !self.get(c).is_zero())
    }

    fn merge(&mut self, other: &Self) {
        for category in Category::ALL {
            self.add(category, other.get(category));
        }
    }
}

/// One day of the weekly view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayBreakdown {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: CategoryTotals,
}

/// The week containing a reference date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// Exactly seven entries, Sunday first.
    pub days: Vec<DayBreakdown>,
    pub totals: CategoryTotals,
    pub total_hours: Hours,
    pub active_days: usize,
    pub daily_average: Hours,
    pub percent_change: f64,
}

/// Builds the Sunday–Saturday breakdown around `date`.
pub fn weekly_summary(activities: &[Activity], date: NaiveDate) -> WeeklySummary {
    let week_start = time::week_start(date);
    let mut days: Vec<DayBreakdown> = (0..7)
        .map_while(|offset| week_start.checked_add_days(Days::new(offset)))
        .map(|day| DayBreakdown {
            date: day,
            totals: CategoryTotals::default(),
        })
        .collect();
    let week_end = days.last().map_or(week_start, |d| d.date);

    for activity in activities {
        if let Some(day) = days.iter_mut().find(|d| d.date == activity.date) {
            day.totals.add_activity(activity);
        }
    }

    let mut totals = CategoryTotals::default();
    for day in &days {
        totals.merge(&day.totals);
    }
    let total_hours: Hours = days.iter().map(|d| d.totals.counted_total()).sum();
    let active_days = days.iter().filter(|d| d.totals.is_active()).count();
    let daily_average = total_hours / i64::try_from(active_days).unwrap_or(0);
    let percent_change = week_over_week_change(activities, date);

    tracing::debug!(%week_start, %total_hours, active_days, "computed weekly summary");

    WeeklySummary {
        week_start,
        week_end,
        days,
        totals,
        total_hours,
        active_days,
        daily_average,
        percent_change,
    }
}

/// Percent change of the trailing seven days against the seven before them.
///
/// Zero when the earlier window has no counted hours.
pub fn week_over_week_change(activities: &[Activity], date: NaiveDate) -> f64 {
    let current_start = time::window_start(date, ROLLING_WINDOW_DAYS);
    let Some(previous_end) = time::previous_day(current_start) else {
        return 0.0;
    };
    let previous_start = time::window_start(previous_end, ROLLING_WINDOW_DAYS);

    let this_week = window_total(activities, current_start, date);
    let last_week = window_total(activities, previous_start, previous_end);
    if last_week.is_zero() {
        return 0.0;
    }
    (this_week - last_week).as_f64() / last_week.as_f64() * 100.0
}

/// Core duration per kind across the whole history, for kinds that occur.
pub fn kind_totals(activities: &[Activity]) -> Vec<(ActivityKind, Hours)> {
    ActivityKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let mut matching = activities.iter().filter(|a| a.kind == kind).peekable();
            matching.peek()?;
            Some((kind, matching.map(Activity::duration).sum()))
        })
        .collect()
}
