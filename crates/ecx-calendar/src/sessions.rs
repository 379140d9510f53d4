//! Derived calendars: expiry days and last trading days of each month.
//!
//! A computed expiry that lands on a non-session or on an already-typed day
//! is rolled back one day at a time until it finds a free regular session.
//! Rolling never leaves the month: if the month start is crossed the entry
//! is dropped. The last-trading-day families roll back the same way from the
//! month end.

use chrono::NaiveDate;
use tracing::debug;

use ecx_changes::{DaySpec, DayType};
use ecx_core::errors::Result;
use ecx_core::{fail, DateSeries};
use ecx_time::date::{month_end, months_between, prev_day_in_month};
use ecx_time::expiry::{expiry_schedule, ExpiryCycle};
use ecx_time::WeekMask;

use crate::config::ExtensionSpec;
use crate::normalizer::Classification;

/// Name of derived last-trading-day entries.
pub const LAST_TRADING_DAY: &str = "last trading day of month";
/// Name of derived last-regular-trading-day entries.
pub const LAST_REGULAR_TRADING_DAY: &str = "last regular trading day of month";

/// The day type an expiry cycle produces.
pub fn expiry_day_type(cycle: ExpiryCycle) -> DayType {
    match cycle {
        ExpiryCycle::Monthly => DayType::MonthlyExpiry,
        ExpiryCycle::Quarterly => DayType::QuarterlyExpiry,
    }
}

/// Session arithmetic over one augmented classification.
#[derive(Debug, Clone, Copy)]
pub struct SessionCalculator<'a> {
    exchange: &'a str,
    weekmask: WeekMask,
    bounds: (NaiveDate, NaiveDate),
    days: &'a Classification,
}

impl<'a> SessionCalculator<'a> {
    /// Calculator for `exchange` with the given weekmask and bounds.
    pub fn new(
        exchange: &'a str,
        weekmask: WeekMask,
        bounds: (NaiveDate, NaiveDate),
        days: &'a Classification,
    ) -> Self {
        Self {
            exchange,
            weekmask,
            bounds,
            days,
        }
    }

    fn in_bounds(&self, date: NaiveDate) -> bool {
        (self.bounds.0..=self.bounds.1).contains(&date)
    }

    /// A trading weekday inside the bounds that is not a holiday.
    pub fn is_session(&self, date: NaiveDate) -> bool {
        self.in_bounds(date)
            && self.weekmask.is_trading_day(date)
            && self.days.day_type(date) != Some(DayType::Holiday)
    }

    /// A session that is neither a special open nor a special close.
    pub fn is_regular_session(&self, date: NaiveDate) -> bool {
        self.is_session(date)
            && !matches!(
                self.days.day_type(date),
                Some(DayType::SpecialOpen | DayType::SpecialClose)
            )
    }

    /// A session that carries no type at all.
    fn is_free_session(&self, date: NaiveDate) -> bool {
        self.is_session(date) && self.days.day_type(date).is_none()
    }

    /// Walk back from `date` within its month to the first day accepted by
    /// `accept`.
    fn roll_back(date: NaiveDate, accept: impl Fn(NaiveDate) -> bool) -> Option<NaiveDate> {
        let mut cur = date;
        loop {
            if accept(cur) {
                return Some(cur);
            }
            cur = prev_day_in_month(cur)?;
        }
    }

    /// Expiry days of one cycle over the whole calendar.
    ///
    /// Added expiries of the cycle's type are emitted as-is. Computed ones
    /// are skipped when their nominal date lies outside the bounds, is
    /// already an expiry, or is removed; they are dropped when rolling
    /// crosses the month start or lands on a removed date.
    pub fn expiries(&self, ext: &ExtensionSpec, cycle: ExpiryCycle) -> Result<DateSeries<DaySpec>> {
        let Some(weekday) = ext.expiry_weekday() else {
            fail!("{}: no expiry weekday configured", self.exchange);
        };
        let day_type = expiry_day_type(cycle);

        let mut out: DateSeries<DaySpec> = self
            .days
            .of_type(day_type)
            .map(|spec| (spec.date, spec.clone()))
            .collect();

        let (first, last) = self.bounds;
        let schedule = expiry_schedule(first, last, weekday, ext.nth, &ext.quarterly_months);
        for raw in schedule.into_iter().filter(|e| e.cycle == cycle) {
            let (year, month) = (raw.year, raw.month);
            if !self.in_bounds(raw.date) {
                debug!(exchange = self.exchange, year, month, "expiry outside calendar bounds");
                continue;
            }
            if self.days.day_type(raw.date).is_some_and(DayType::is_expiry) {
                debug!(exchange = self.exchange, year, month, "expiry already added");
                continue;
            }
            if self.days.is_suppressed(day_type, raw.date) {
                debug!(exchange = self.exchange, year, month, "expiry removed");
                continue;
            }
            let Some(date) = Self::roll_back(raw.date, |d| self.is_free_session(d)) else {
                debug!(exchange = self.exchange, year, month, "expiry dropped, no free session in month");
                continue;
            };
            if self.days.is_suppressed(day_type, date) {
                debug!(exchange = self.exchange, year, month, %date, "rolled expiry removed");
                continue;
            }
            if date != raw.date {
                debug!(exchange = self.exchange, nominal = %raw.date, %date, "expiry rolled back");
            }
            out.insert(date, DaySpec::new(date, cycle.name()));
        }
        Ok(out)
    }

    /// Last session of each month, skipping only non-trading days.
    pub fn last_trading_days(&self, ext: &ExtensionSpec) -> Result<DateSeries<DaySpec>> {
        self.last_days(ext, LAST_TRADING_DAY, |d| self.is_session(d))
    }

    /// Last session of each month that is not a special open or close.
    pub fn last_regular_trading_days(&self, ext: &ExtensionSpec) -> Result<DateSeries<DaySpec>> {
        self.last_days(ext, LAST_REGULAR_TRADING_DAY, |d| self.is_regular_session(d))
    }

    fn last_days(
        &self,
        ext: &ExtensionSpec,
        name: &str,
        accept: impl Fn(NaiveDate) -> bool,
    ) -> Result<DateSeries<DaySpec>> {
        if ext.expiry_weekday().is_none() {
            fail!("{}: no expiry weekday configured", self.exchange);
        }
        let (first, last) = self.bounds;
        let mut out = DateSeries::new();
        for (year, month) in months_between(first, last) {
            let Some(end) = NaiveDate::from_ymd_opt(year, month, 1).map(month_end) else {
                continue;
            };
            if end > last {
                debug!(exchange = self.exchange, year, month, family = name, "month extends past calendar bounds");
                continue;
            }
            match Self::roll_back(end, &accept) {
                Some(date) => {
                    out.insert(date, DaySpec::new(date, name));
                }
                None => {
                    debug!(exchange = self.exchange, year, month, family = name, "no qualifying session in month");
                }
            }
        }
        Ok(out)
    }

    /// Sessions in `[start, end]`, clipped to the bounds.
    pub fn sessions(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let lo = start.max(self.bounds.0);
        let hi = end.min(self.bounds.1);
        lo.iter_days()
            .take_while(|d| *d <= hi)
            .filter(|d| self.is_session(*d))
            .collect()
    }

    /// Return `true` if `date` is the last session of its month.
    pub fn is_last_session_of_month(&self, date: NaiveDate) -> bool {
        self.is_session(date) && Self::roll_back(month_end(date), |d| self.is_session(d)) == Some(date)
    }
}
