//! Calendar arithmetic on `chrono::NaiveDate`.
//!
//! Month boundaries, the n-th weekday of a month and Easter. Everything here
//! is pure and total over the dates `chrono` can represent; helpers that can
//! fall outside a month return `Option`.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Whether a given year is a leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a given month/year.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    date.with_day(days_in_month(date.year(), date.month()))
        .unwrap_or(date)
}

/// The day before `date`, if it lies in the same month.
pub fn prev_day_in_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.day() == 1 {
        None
    } else {
        date.pred_opt()
    }
}

/// Iterate over the `(year, month)` pairs touched by `[start, end]`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = (i32, u32)> {
    let first = start.year() * 12 + start.month0() as i32;
    let last = end.year() * 12 + end.month0() as i32;
    (first..=last).map(|m| (m.div_euclid(12), m.rem_euclid(12) as u32 + 1))
}

/// Return the *n*-th occurrence of `weekday` in `year`/`month`.
///
/// `n` counts from one. A negative `n` counts from the end of the month, so
/// `-1` is the last occurrence. Returns `None` if the occurrence does not
/// exist.
///
/// For the third occurrence this equals `15 + (weekday - dow(15)) mod 7`.
pub fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: i32) -> Option<NaiveDate> {
    if n == 0 {
        return None;
    }
    let target = weekday.num_days_from_monday() as i32;
    if n > 0 {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let skip = (target - first.weekday().num_days_from_monday() as i32).rem_euclid(7);
        let day = 1 + skip + 7 * (n - 1);
        NaiveDate::from_ymd_opt(year, month, u32::try_from(day).ok()?)
    } else {
        let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
        let back = (last.weekday().num_days_from_monday() as i32 - target).rem_euclid(7);
        let day = last.day() as i32 - back - 7 * (-n - 1);
        if day < 1 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, u32::try_from(day).ok()?)
    }
}

/// Easter Sunday in the Gregorian calendar (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Shift `date` by a signed number of days.
pub fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}
