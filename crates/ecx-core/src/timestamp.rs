//! A point in time that is either wall-clock (naive) or an absolute instant.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone};

/// A timestamp used as an interval bound in metadata queries.
///
/// Naive timestamps carry wall-clock components only. Aware timestamps carry
/// a UTC offset and therefore identify a unique instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    /// Wall-clock date and time without timezone.
    Naive(NaiveDateTime),
    /// An instant with a fixed UTC offset.
    Aware(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Return `true` if this timestamp carries a UTC offset.
    pub fn is_aware(&self) -> bool {
        matches!(self, Timestamp::Aware(_))
    }

    /// Return the wall-clock components, if naive.
    pub fn as_naive(&self) -> Option<NaiveDateTime> {
        match self {
            Timestamp::Naive(ndt) => Some(*ndt),
            Timestamp::Aware(_) => None,
        }
    }

    /// Return the instant, if aware.
    pub fn as_instant(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Timestamp::Naive(_) => None,
            Timestamp::Aware(dt) => Some(*dt),
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(ndt: NaiveDateTime) -> Self {
        Timestamp::Naive(ndt)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Timestamp::Naive(date.and_time(NaiveTime::MIN))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        let offset = dt.offset().fix();
        Timestamp::Aware(dt.with_timezone(&offset))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Naive(ndt) => write!(f, "{ndt}"),
            Timestamp::Aware(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn date_becomes_naive_midnight() {
        let d = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let ts = Timestamp::from(d);
        assert!(!ts.is_aware());
        assert_eq!(ts.as_naive(), Some(d.and_hms_opt(0, 0, 0).unwrap()));
    }

    #[test]
    fn utc_datetime_becomes_aware() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 30, 23, 0, 0).unwrap();
        let ts = Timestamp::from(dt);
        assert!(ts.is_aware());
        assert_eq!(ts.as_instant().unwrap().timestamp(), dt.timestamp());
    }
}
