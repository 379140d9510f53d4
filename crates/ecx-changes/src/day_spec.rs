//! `DaySpec` — the payload of an added special day.

use chrono::{NaiveDate, NaiveTime};

use ecx_core::errors::{Error, Result};

use crate::day_type::DayType;

/// A named special day, optionally carrying a session time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DaySpec {
    /// The date.
    pub date: NaiveDate,
    /// Display name.
    pub name: String,
    /// Open or close time; present only for special opens and closes.
    pub time: Option<NaiveTime>,
}

impl DaySpec {
    /// A day without a session time.
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            time: None,
        }
    }

    /// A day with a session time.
    pub fn with_time(date: NaiveDate, name: impl Into<String>, time: NaiveTime) -> Self {
        Self {
            date,
            name: name.into(),
            time: Some(time),
        }
    }

    /// Check that the time field matches `day_type`.
    pub fn validate_for(&self, day_type: DayType) -> Result<()> {
        match (day_type.requires_time(), self.time) {
            (true, None) => Err(Error::InvalidArgument(format!(
                "{day_type} on {} requires a time",
                self.date
            ))),
            (false, Some(t)) => Err(Error::InvalidArgument(format!(
                "{day_type} on {} must not carry a time, got {t}",
                self.date
            ))),
            _ => Ok(()),
        }
    }
}
