//! Parsing boundary for dates, times and timestamps.
//!
//! Public entry points accept anything implementing [`AsDate`], [`AsTime`]
//! or [`AsTimestamp`]. Parsing happens once at the boundary; everything
//! behind it works with `chrono` values only.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::errors::{Error, Result};
use crate::timestamp::Timestamp;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%d/%m/%Y"];
const MIDNIGHT_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];
const NAIVE_TS_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYYMMDD`, `DD/MM/YYYY`, and a datetime string
/// whose time component is exactly midnight.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            // `%Y%m%d` would otherwise accept shorter digit runs.
            if *fmt == "%Y%m%d" && s.len() != 8 {
                continue;
            }
            return Ok(d);
        }
    }
    for fmt in MIDNIGHT_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return ndt.as_date();
        }
    }
    Err(Error::InvalidArgument(format!("cannot parse date from {s:?}")))
}

/// Parse a wall-clock time in `HH:MM` or `HH:MM:SS` form.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| Error::InvalidArgument(format!("cannot parse time from {s:?}")))
}

/// Parse a timestamp.
///
/// Strings carrying a UTC offset (RFC 3339) become [`Timestamp::Aware`];
/// strings without one become [`Timestamp::Naive`]. A bare date is read as
/// naive midnight.
pub fn parse_timestamp(s: &str) -> Result<Timestamp> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Timestamp::Aware(dt));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(Timestamp::Aware(dt));
    }
    for fmt in NAIVE_TS_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Timestamp::Naive(ndt));
        }
    }
    if let Ok(d) = parse_date(s) {
        return Ok(Timestamp::from(d));
    }
    Err(Error::InvalidArgument(format!("cannot parse timestamp from {s:?}")))
}

// ── Conversion traits ────────────────────────────────────────────────────────

/// Values that denote a calendar date.
pub trait AsDate {
    /// Convert to a `NaiveDate`, failing on malformed input.
    fn as_date(&self) -> Result<NaiveDate>;
}

/// Values that denote a wall-clock time.
pub trait AsTime {
    /// Convert to a `NaiveTime`, failing on malformed input.
    fn as_time(&self) -> Result<NaiveTime>;
}

/// Values that denote a timestamp, naive or aware.
pub trait AsTimestamp {
    /// Convert to a [`Timestamp`], failing on malformed input.
    fn as_timestamp(&self) -> Result<Timestamp>;
}

impl AsDate for NaiveDate {
    fn as_date(&self) -> Result<NaiveDate> {
        Ok(*self)
    }
}

impl AsDate for NaiveDateTime {
    fn as_date(&self) -> Result<NaiveDate> {
        if self.time() != NaiveTime::MIN {
            return Err(Error::InvalidArgument(format!(
                "expected a date, got {self} with non-midnight time"
            )));
        }
        Ok(self.date())
    }
}

impl AsDate for str {
    fn as_date(&self) -> Result<NaiveDate> {
        parse_date(self)
    }
}

impl AsDate for String {
    fn as_date(&self) -> Result<NaiveDate> {
        parse_date(self)
    }
}

impl<T: AsDate + ?Sized> AsDate for &T {
    fn as_date(&self) -> Result<NaiveDate> {
        (**self).as_date()
    }
}

impl AsTime for NaiveTime {
    fn as_time(&self) -> Result<NaiveTime> {
        Ok(*self)
    }
}

impl AsTime for str {
    fn as_time(&self) -> Result<NaiveTime> {
        parse_time(self)
    }
}

impl AsTime for String {
    fn as_time(&self) -> Result<NaiveTime> {
        parse_time(self)
    }
}

impl<T: AsTime + ?Sized> AsTime for &T {
    fn as_time(&self) -> Result<NaiveTime> {
        (**self).as_time()
    }
}

impl AsTimestamp for Timestamp {
    fn as_timestamp(&self) -> Result<Timestamp> {
        Ok(*self)
    }
}

impl AsTimestamp for NaiveDate {
    fn as_timestamp(&self) -> Result<Timestamp> {
        Ok(Timestamp::from(*self))
    }
}

impl AsTimestamp for NaiveDateTime {
    fn as_timestamp(&self) -> Result<Timestamp> {
        Ok(Timestamp::Naive(*self))
    }
}

impl<Tz: TimeZone> AsTimestamp for DateTime<Tz> {
    fn as_timestamp(&self) -> Result<Timestamp> {
        Ok(Timestamp::from(self.clone()))
    }
}

impl AsTimestamp for str {
    fn as_timestamp(&self) -> Result<Timestamp> {
        parse_timestamp(self)
    }
}

impl AsTimestamp for String {
    fn as_timestamp(&self) -> Result<Timestamp> {
        parse_timestamp(self)
    }
}

impl<T: AsTimestamp + ?Sized> AsTimestamp for &T {
    fn as_timestamp(&self) -> Result<Timestamp> {
        (**self).as_timestamp()
    }
}
