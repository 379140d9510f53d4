//! Recurring holiday rules.
//!
//! A [`HolidayRule`] yields the dates on which a named holiday (or special
//! session) occurs inside a date window. Rules cover fixed dates with an
//! optional weekend observance, the n-th weekday of a month, Easter-relative
//! days, weekly recurrences and one-off dates. Each rule may be limited to a
//! validity window.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::date::{easter_sunday, nth_weekday, shift};

/// How a fixed-date holiday that falls on a weekend is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observance {
    /// Observed on the calendar date.
    #[default]
    None,
    /// Saturday or Sunday moves to the following Monday.
    NextMonday,
    /// Only Sunday moves to Monday.
    SundayToMonday,
    /// Saturday moves to Friday, Sunday to Monday.
    NearestWorkday,
    /// Second of two adjacent holidays: Saturday moves to Monday, Sunday and
    /// Monday move to Tuesday.
    NextMondayOrTuesday,
}

impl Observance {
    /// Apply the observance to `date`.
    pub fn apply(self, date: NaiveDate) -> NaiveDate {
        let wd = date.weekday();
        let moved = match (self, wd) {
            (Observance::NextMonday, Weekday::Sat) => shift(date, 2),
            (Observance::NextMonday, Weekday::Sun) => shift(date, 1),
            (Observance::SundayToMonday, Weekday::Sun) => shift(date, 1),
            (Observance::NearestWorkday, Weekday::Sat) => shift(date, -1),
            (Observance::NearestWorkday, Weekday::Sun) => shift(date, 1),
            (Observance::NextMondayOrTuesday, Weekday::Sat) => shift(date, 2),
            (Observance::NextMondayOrTuesday, Weekday::Sun | Weekday::Mon) => shift(date, 1),
            _ => None,
        };
        moved.unwrap_or(date)
    }
}

/// The recurrence pattern of a [`HolidayRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// The same month/day every year.
    Fixed {
        /// Month, 1-based.
        month: u32,
        /// Day of month.
        day: u32,
        /// Weekend handling.
        #[serde(default)]
        observance: Observance,
    },
    /// The n-th weekday of a month; negative `n` counts from the month end.
    NthWeekday {
        /// Month, 1-based.
        month: u32,
        /// Weekday.
        weekday: Weekday,
        /// Occurrence index.
        n: i32,
    },
    /// A fixed offset in days from Easter Sunday (Good Friday is `-2`).
    Easter {
        /// Signed offset in days.
        offset: i64,
    },
    /// Every occurrence of a weekday.
    DayOfWeek {
        /// Weekday.
        weekday: Weekday,
    },
    /// A single date.
    Date {
        /// The date.
        date: NaiveDate,
    },
}

/// A named recurring rule with an optional validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRule {
    /// Display name attached to every produced date.
    pub name: String,
    /// Recurrence pattern.
    #[serde(flatten)]
    pub kind: RuleKind,
    /// First date on which the rule applies.
    #[serde(default)]
    pub start: Option<NaiveDate>,
    /// Last date on which the rule applies.
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl HolidayRule {
    /// A rule with an unbounded validity window.
    pub fn new(name: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            start: None,
            end: None,
        }
    }

    /// Fixed month/day without observance.
    pub fn fixed(name: impl Into<String>, month: u32, day: u32) -> Self {
        Self::new(
            name,
            RuleKind::Fixed {
                month,
                day,
                observance: Observance::None,
            },
        )
    }

    /// Fixed month/day observed per `observance`.
    pub fn observed(name: impl Into<String>, month: u32, day: u32, observance: Observance) -> Self {
        Self::new(name, RuleKind::Fixed { month, day, observance })
    }

    /// The n-th weekday of a month.
    pub fn nth_weekday(name: impl Into<String>, month: u32, weekday: Weekday, n: i32) -> Self {
        Self::new(name, RuleKind::NthWeekday { month, weekday, n })
    }

    /// An Easter-relative day.
    pub fn easter(name: impl Into<String>, offset: i64) -> Self {
        Self::new(name, RuleKind::Easter { offset })
    }

    /// Every `weekday`.
    pub fn weekly(name: impl Into<String>, weekday: Weekday) -> Self {
        Self::new(name, RuleKind::DayOfWeek { weekday })
    }

    /// A single date.
    pub fn once(name: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(name, RuleKind::Date { date })
    }

    /// Restrict the validity window.
    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// All dates in `[start, end]` produced by this rule, ascending.
    pub fn dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let lo = self.start.map_or(start, |s| s.max(start));
        let hi = self.end.map_or(end, |e| e.min(end));
        if lo > hi {
            return Vec::new();
        }
        let mut out: Vec<NaiveDate> = match &self.kind {
            RuleKind::DayOfWeek { weekday } => weekly_dates(*weekday, lo, hi),
            RuleKind::Date { date } => vec![*date],
            kind => {
                // Observance may move a date across the year boundary.
                let years = (lo.year() - 1)..=(hi.year() + 1);
                years.filter_map(|y| yearly_date(kind, y)).collect()
            }
        };
        out.retain(|d| (lo..=hi).contains(d));
        out.sort_unstable();
        out.dedup();
        out
    }
}

fn yearly_date(kind: &RuleKind, year: i32) -> Option<NaiveDate> {
    match kind {
        RuleKind::Fixed {
            month,
            day,
            observance,
        } => NaiveDate::from_ymd_opt(year, *month, *day).map(|d| observance.apply(d)),
        RuleKind::NthWeekday { month, weekday, n } => nth_weekday(year, *month, *weekday, *n),
        RuleKind::Easter { offset } => easter_sunday(year).and_then(|e| shift(e, *offset)),
        RuleKind::DayOfWeek { .. } | RuleKind::Date { .. } => None,
    }
}

fn weekly_dates(weekday: Weekday, lo: NaiveDate, hi: NaiveDate) -> Vec<NaiveDate> {
    let skip = (weekday.num_days_from_monday() as i64
        - lo.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let mut out = Vec::new();
    let mut d = shift(lo, skip);
    while let Some(cur) = d.filter(|c| *c <= hi) {
        out.push(cur);
        d = cur.checked_add_days(Days::new(7));
    }
    out
}
