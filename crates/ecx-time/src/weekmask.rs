//! `WeekMask` — the regular trading weekdays of an exchange.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use ecx_core::errors::{Error, Result};

/// Weekday from a Monday-based index (0 = Monday … 6 = Sunday).
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// Seven flags, Monday first; `true` marks a regular trading weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekMask([bool; 7]);

impl Default for WeekMask {
    /// Monday to Friday.
    fn default() -> Self {
        WeekMask([true, true, true, true, true, false, false])
    }
}

impl WeekMask {
    /// Build from explicit flags, Monday first.
    pub fn new(flags: [bool; 7]) -> Self {
        WeekMask(flags)
    }

    /// Parse a mask such as `"1111100"`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != 7 {
            return Err(Error::InvalidArgument(format!(
                "weekmask must have 7 characters, got {s:?}"
            )));
        }
        let mut flags = [false; 7];
        for (slot, c) in flags.iter_mut().zip(s.chars()) {
            *slot = match c {
                '1' => true,
                '0' => false,
                _ => {
                    return Err(Error::InvalidArgument(format!(
                        "weekmask may only contain '0' and '1', got {s:?}"
                    )))
                }
            };
        }
        Ok(WeekMask(flags))
    }

    /// Return `true` if `weekday` is a regular trading weekday.
    pub fn is_trading_weekday(&self, weekday: Weekday) -> bool {
        self.0[weekday.num_days_from_monday() as usize]
    }

    /// Return `true` if `date` falls on a regular trading weekday.
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        self.is_trading_weekday(date.weekday())
    }

    /// Return `true` if `date` falls on a weekend day under this mask.
    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        !self.is_trading_day(date)
    }

    /// The non-trading weekdays, Monday first.
    pub fn weekend_days(&self) -> Vec<Weekday> {
        (0..7u8)
            .filter(|&i| !self.0[i as usize])
            .filter_map(weekday_from_index)
            .collect()
    }
}

impl TryFrom<String> for WeekMask {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        WeekMask::parse(&s)
    }
}

impl From<WeekMask> for String {
    fn from(mask: WeekMask) -> String {
        mask.to_string()
    }
}

impl std::fmt::Display for WeekMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for flag in self.0 {
            f.write_str(if flag { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_is_monday_to_friday() {
        let mask = WeekMask::default();
        assert_eq!(mask.to_string(), "1111100");
        // 2023-09-02 is a Saturday
        assert!(mask.is_weekend(date(2023, 9, 2)));
        assert!(mask.is_trading_day(date(2023, 9, 4)));
        assert_eq!(mask.weekend_days(), vec![Weekday::Sat, Weekday::Sun]);
    }

    #[test]
    fn parse_sunday_to_thursday() {
        let mask = WeekMask::parse("1111001").unwrap();
        assert!(mask.is_trading_weekday(Weekday::Sun));
        assert!(!mask.is_trading_weekday(Weekday::Fri));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(WeekMask::parse("11111").is_err());
        assert!(WeekMask::parse("11111x0").is_err());
    }

    #[test]
    fn index_mapping() {
        assert_eq!(weekday_from_index(0), Some(Weekday::Mon));
        assert_eq!(weekday_from_index(4), Some(Weekday::Fri));
        assert_eq!(weekday_from_index(7), None);
    }
}
