//! Xetra (Frankfurt) exchange calendar.

use chrono::NaiveDate;
use chrono_tz::Tz;

use ecx_core::errors::Result;

use crate::base_calendar::BaseCalendar;
use crate::holiday::HolidayRule;

/// Xetra calendar covering `[first, last]`.
///
/// Weekends and the following holidays are observed:
/// * New Year's Day (Jan 1)
/// * Good Friday
/// * Easter Monday
/// * Labour Day (May 1)
/// * Christmas Eve (Dec 24)
/// * Christmas Day (Dec 25)
/// * Boxing Day (Dec 26)
/// * New Year's Eve (Dec 31)
pub fn xetr(first: NaiveDate, last: NaiveDate) -> Result<BaseCalendar> {
    Ok(BaseCalendar::new("XETR", Tz::Europe__Berlin, first, last)?
        .with_holiday(HolidayRule::fixed("New Year's Day", 1, 1))
        .with_holiday(HolidayRule::easter("Good Friday", -2))
        .with_holiday(HolidayRule::easter("Easter Monday", 1))
        .with_holiday(HolidayRule::fixed("Labour Day", 5, 1))
        .with_holiday(HolidayRule::fixed("Christmas Eve", 12, 24))
        .with_holiday(HolidayRule::fixed("Christmas Day", 12, 25))
        .with_holiday(HolidayRule::fixed("Boxing Day", 12, 26))
        .with_holiday(HolidayRule::fixed("New Year's Eve", 12, 31)))
}
