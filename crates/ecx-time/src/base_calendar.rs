//! Base calendar built from explicit rules.
//!
//! `BaseCalendar` is the in-memory [`CalendarSource`]: holidays, special
//! opens and special closes are registered through builder methods, or the
//! whole calendar is loaded from JSON.

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use ecx_core::errors::{Error, Result};

use crate::calendar::{CalendarSource, TimedDates, TimedRules};
use crate::holiday::HolidayRule;
use crate::weekmask::WeekMask;

/// A calendar whose rules are supplied at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseCalendar {
    name: String,
    tz: Tz,
    #[serde(default)]
    weekmask: WeekMask,
    first: NaiveDate,
    last: NaiveDate,
    #[serde(default)]
    holidays: Vec<HolidayRule>,
    #[serde(default)]
    adhoc_holidays: Vec<NaiveDate>,
    #[serde(default)]
    special_opens: Vec<TimedRules>,
    #[serde(default)]
    special_opens_adhoc: Vec<TimedDates>,
    #[serde(default)]
    special_closes: Vec<TimedRules>,
    #[serde(default)]
    special_closes_adhoc: Vec<TimedDates>,
}

impl BaseCalendar {
    /// Create a calendar covering `[first, last]` with no holidays.
    pub fn new(name: impl Into<String>, tz: Tz, first: NaiveDate, last: NaiveDate) -> Result<Self> {
        let name = name.into();
        if first > last {
            return Err(Error::InvalidArgument(format!(
                "calendar {name}: first date {first} is after last date {last}"
            )));
        }
        Ok(Self {
            name,
            tz,
            weekmask: WeekMask::default(),
            first,
            last,
            holidays: Vec::new(),
            adhoc_holidays: Vec::new(),
            special_opens: Vec::new(),
            special_opens_adhoc: Vec::new(),
            special_closes: Vec::new(),
            special_closes_adhoc: Vec::new(),
        })
    }

    /// Load a calendar from its JSON representation.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cal: Self = serde_json::from_str(s)
            .map_err(|e| Error::InvalidArgument(format!("malformed calendar definition: {e}")))?;
        if cal.first > cal.last {
            return Err(Error::InvalidArgument(format!(
                "calendar {}: first date {} is after last date {}",
                cal.name, cal.first, cal.last
            )));
        }
        Ok(cal)
    }

    /// Replace the weekmask.
    pub fn with_weekmask(mut self, weekmask: WeekMask) -> Self {
        self.weekmask = weekmask;
        self
    }

    /// Append a recurring holiday rule (lowest priority so far).
    pub fn with_holiday(mut self, rule: HolidayRule) -> Self {
        self.holidays.push(rule);
        self
    }

    /// Append one-off holiday dates.
    pub fn with_adhoc_holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.adhoc_holidays.extend(dates);
        self
    }

    /// Append a recurring special-open rule.
    pub fn with_special_open(self, time: NaiveTime, rule: HolidayRule) -> Self {
        self.with_timed_rule(time, rule, true)
    }

    /// Append one-off special opens.
    pub fn with_special_opens_adhoc(
        mut self,
        time: NaiveTime,
        dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        push_timed_dates(&mut self.special_opens_adhoc, time, dates);
        self
    }

    /// Append a recurring special-close rule.
    pub fn with_special_close(self, time: NaiveTime, rule: HolidayRule) -> Self {
        self.with_timed_rule(time, rule, false)
    }

    /// Append one-off special closes.
    pub fn with_special_closes_adhoc(
        mut self,
        time: NaiveTime,
        dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        push_timed_dates(&mut self.special_closes_adhoc, time, dates);
        self
    }

    fn with_timed_rule(mut self, time: NaiveTime, rule: HolidayRule, open: bool) -> Self {
        let groups = if open {
            &mut self.special_opens
        } else {
            &mut self.special_closes
        };
        match groups.iter_mut().find(|g| g.time == time) {
            Some(group) => group.rules.push(rule),
            None => groups.push(TimedRules {
                time,
                rules: vec![rule],
            }),
        }
        self
    }
}

fn push_timed_dates(
    groups: &mut Vec<TimedDates>,
    time: NaiveTime,
    dates: impl IntoIterator<Item = NaiveDate>,
) {
    match groups.iter_mut().find(|g| g.time == time) {
        Some(group) => group.dates.extend(dates),
        None => groups.push(TimedDates {
            time,
            dates: dates.into_iter().collect(),
        }),
    }
}

impl CalendarSource for BaseCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    fn tz(&self) -> Tz {
        self.tz
    }

    fn weekmask(&self) -> WeekMask {
        self.weekmask
    }

    fn bounds(&self) -> (NaiveDate, NaiveDate) {
        (self.first, self.last)
    }

    fn regular_holidays(&self) -> &[HolidayRule] {
        &self.holidays
    }

    fn adhoc_holidays(&self) -> &[NaiveDate] {
        &self.adhoc_holidays
    }

    fn special_opens(&self) -> &[TimedRules] {
        &self.special_opens
    }

    fn special_opens_adhoc(&self) -> &[TimedDates] {
        &self.special_opens_adhoc
    }

    fn special_closes(&self) -> &[TimedRules] {
        &self.special_closes
    }

    fn special_closes_adhoc(&self) -> &[TimedDates] {
        &self.special_closes_adhoc
    }
}
