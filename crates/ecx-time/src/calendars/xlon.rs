//! London Stock Exchange calendar.

use chrono::{NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;

use ecx_core::errors::{Error, Result};

use crate::base_calendar::BaseCalendar;
use crate::holiday::{HolidayRule, Observance};

/// London Stock Exchange calendar covering `[first, last]`.
///
/// Holidays:
/// * New Year's Day (Jan 1; weekend → Mon)
/// * Good Friday
/// * Easter Monday
/// * Early May Bank Holiday (1st Mon in May)
/// * Spring Bank Holiday (last Mon in May)
/// * Summer Bank Holiday (last Mon in Aug)
/// * Christmas Day (Dec 25; weekend → Mon)
/// * Boxing Day (Dec 26; Sat → Mon, Sun or Mon → Tue)
///
/// Early closes at 12:30 on Christmas Eve and New Year's Eve.
pub fn xlon(first: NaiveDate, last: NaiveDate) -> Result<BaseCalendar> {
    let half_day = NaiveTime::from_hms_opt(12, 30, 0)
        .ok_or_else(|| Error::InvalidArgument("invalid early close time".into()))?;
    Ok(BaseCalendar::new("XLON", Tz::Europe__London, first, last)?
        .with_holiday(HolidayRule::observed("New Year's Day", 1, 1, Observance::NextMonday))
        .with_holiday(HolidayRule::easter("Good Friday", -2))
        .with_holiday(HolidayRule::easter("Easter Monday", 1))
        .with_holiday(HolidayRule::nth_weekday("Early May Bank Holiday", 5, Weekday::Mon, 1))
        .with_holiday(HolidayRule::nth_weekday("Spring Bank Holiday", 5, Weekday::Mon, -1))
        .with_holiday(HolidayRule::nth_weekday("Summer Bank Holiday", 8, Weekday::Mon, -1))
        .with_holiday(HolidayRule::observed("Christmas", 12, 25, Observance::NextMonday))
        .with_holiday(HolidayRule::observed(
            "Boxing Day",
            12,
            26,
            Observance::NextMondayOrTuesday,
        ))
        .with_special_close(half_day, HolidayRule::fixed("Christmas Eve", 12, 24))
        .with_special_close(half_day, HolidayRule::fixed("New Year's Eve", 12, 31)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holidays(year: i32) -> Vec<NaiveDate> {
        let cal = xlon(date(year, 1, 1), date(year, 12, 31)).unwrap();
        let (lo, hi) = cal.bounds();
        let mut out: Vec<_> = cal
            .regular_holidays()
            .iter()
            .flat_map(|r| r.dates(lo, hi))
            .collect();
        out.sort();
        out
    }

    #[test]
    fn new_years_day_2023() {
        // Jan 2, 2023 (Monday, as Jan 1 was Sunday)
        assert!(holidays(2023).contains(&date(2023, 1, 2)));
    }

    #[test]
    fn full_list_2023() {
        assert_eq!(
            holidays(2023),
            vec![
                date(2023, 1, 2),
                date(2023, 4, 7),
                date(2023, 4, 10),
                date(2023, 5, 1),
                date(2023, 5, 29),
                date(2023, 8, 28),
                date(2023, 12, 25),
                date(2023, 12, 26),
            ]
        );
    }

    #[test]
    fn early_closes() {
        let cal = xlon(date(2023, 1, 1), date(2023, 12, 31)).unwrap();
        let closes = cal.special_closes();
        assert_eq!(closes.len(), 1);
        assert_eq!(closes[0].time, NaiveTime::from_hms_opt(12, 30, 0).unwrap());
        assert_eq!(closes[0].rules.len(), 2);
    }
}
