//! `CalendarSource` — the read-only view of a base exchange calendar.
//!
//! A source supplies the primitives an augmented calendar is built from:
//! ordered holiday rules and ad-hoc dates, special open/close rules with
//! their times, the weekmask, the timezone and the date bounds. Rule order
//! is significant: when two rules produce the same date, the earlier rule
//! wins.

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::holiday::HolidayRule;
use crate::weekmask::WeekMask;

/// Rules that share a session time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedRules {
    /// Open or close time, exchange-local.
    pub time: NaiveTime,
    /// Rules producing the affected dates.
    pub rules: Vec<HolidayRule>,
}

/// Ad-hoc dates that share a session time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedDates {
    /// Open or close time, exchange-local.
    pub time: NaiveTime,
    /// Affected dates.
    pub dates: Vec<NaiveDate>,
}

/// A base trading calendar for one exchange.
pub trait CalendarSource: std::fmt::Debug + Send + Sync {
    /// Human-readable name (e.g. `"XETR"`).
    fn name(&self) -> &str;

    /// Exchange timezone.
    fn tz(&self) -> Tz;

    /// Regular trading weekdays.
    fn weekmask(&self) -> WeekMask {
        WeekMask::default()
    }

    /// Inclusive first and last date the calendar covers.
    fn bounds(&self) -> (NaiveDate, NaiveDate);

    /// Recurring holiday rules, highest priority first.
    fn regular_holidays(&self) -> &[HolidayRule];

    /// One-off holiday dates.
    fn adhoc_holidays(&self) -> &[NaiveDate] {
        &[]
    }

    /// Recurring special-open rules grouped by open time.
    fn special_opens(&self) -> &[TimedRules] {
        &[]
    }

    /// One-off special opens grouped by open time.
    fn special_opens_adhoc(&self) -> &[TimedDates] {
        &[]
    }

    /// Recurring special-close rules grouped by close time.
    fn special_closes(&self) -> &[TimedRules] {
        &[]
    }

    /// One-off special closes grouped by close time.
    fn special_closes_adhoc(&self) -> &[TimedDates] {
        &[]
    }

    /// Return `true` if `date` lies within [`bounds`](Self::bounds).
    fn in_bounds(&self, date: NaiveDate) -> bool {
        let (first, last) = self.bounds();
        (first..=last).contains(&date)
    }
}
