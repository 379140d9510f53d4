//! Expiry date utilities.
//!
//! Derivative expiries fall on the n-th occurrence (third by default) of a
//! fixed weekday in each month. Quarterly expiries occupy March, June,
//! September and December unless configured otherwise; monthly expiries
//! occupy the remaining months. Dates produced here are *unrolled*: they
//! ignore holidays, which are handled when the derived calendar is built.

use chrono::{NaiveDate, Weekday};

use crate::date::{months_between, nth_weekday};

/// Default quarterly expiry months.
pub const QUARTERLY_MONTHS: [u32; 4] = [3, 6, 9, 12];

/// Whether a month carries a monthly or a quarterly expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpiryCycle {
    /// Non-quarterly month.
    Monthly,
    /// Quarterly month.
    Quarterly,
}

impl ExpiryCycle {
    /// Classify `month` against the quarterly month list.
    pub fn of_month(month: u32, quarterly_months: &[u32]) -> Self {
        if quarterly_months.contains(&month) {
            ExpiryCycle::Quarterly
        } else {
            ExpiryCycle::Monthly
        }
    }

    /// Entry name used in derived calendars.
    pub fn name(self) -> &'static str {
        match self {
            ExpiryCycle::Monthly => "monthly expiry",
            ExpiryCycle::Quarterly => "quarterly expiry",
        }
    }
}

/// One unrolled expiry: the month it belongs to and its nominal date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawExpiry {
    /// Cycle of the month.
    pub cycle: ExpiryCycle,
    /// Year of the month.
    pub year: i32,
    /// Month, 1-based.
    pub month: u32,
    /// Nominal expiry date.
    pub date: NaiveDate,
}

/// Nominal expiry date for `year`/`month`.
pub fn expiry_date(year: i32, month: u32, weekday: Weekday, nth: u32) -> Option<NaiveDate> {
    nth_weekday(year, month, weekday, i32::try_from(nth).ok()?)
}

/// Every nominal expiry whose month intersects `[start, end]`, ascending.
///
/// Months where the n-th occurrence does not exist are skipped.
pub fn expiry_schedule(
    start: NaiveDate,
    end: NaiveDate,
    weekday: Weekday,
    nth: u32,
    quarterly_months: &[u32],
) -> Vec<RawExpiry> {
    if start > end {
        return Vec::new();
    }
    months_between(start, end)
        .filter_map(|(year, month)| {
            expiry_date(year, month, weekday, nth).map(|date| RawExpiry {
                cycle: ExpiryCycle::of_month(month, quarterly_months),
                year,
                month,
                date,
            })
        })
        .collect()
}
