//! Per-date comments and tags.
//!
//! A record covers the day `[midnight, next midnight)` of its date. Queries
//! with naive bounds treat every day as a plain 24 hour wall-clock span;
//! queries with aware bounds use the exchange's real local midnights, so a
//! day may last 23 or 25 hours around daylight-saving changes.

use std::collections::BTreeSet;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use ecx_core::errors::{Error, Result};
use ecx_core::{ensure, DateSeries, Timestamp};

/// Comment and tags attached to one date.
///
/// A record with no comment and no tags is still a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMeta {
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Tags, kept sorted.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl DayMeta {
    /// Record with a comment and tags.
    pub fn new<S: Into<String>>(comment: Option<&str>, tags: impl IntoIterator<Item = S>) -> Self {
        Self {
            comment: comment.map(str::to_owned),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Return `true` if the record carries neither comment nor tags.
    pub fn is_empty(&self) -> bool {
        self.comment.is_none() && self.tags.is_empty()
    }
}

/// Metadata records of one exchange, ordered by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataIndex {
    records: DateSeries<DayMeta>,
}

impl MetadataIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Return `true` if the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Create or replace the record of `date`.
    pub fn set(&mut self, date: NaiveDate, meta: DayMeta) {
        self.records.insert(date, meta);
    }

    /// Set the comment of `date`, creating the record if needed.
    pub fn set_comment(&mut self, date: NaiveDate, comment: Option<String>) {
        self.records.entry_or_default(date).comment = comment;
    }

    /// Set the tags of `date`, creating the record if needed.
    pub fn set_tags(&mut self, date: NaiveDate, tags: BTreeSet<String>) {
        self.records.entry_or_default(date).tags = tags;
    }

    /// Delete the record of `date`.
    pub fn remove(&mut self, date: NaiveDate) -> Option<DayMeta> {
        self.records.remove(&date)
    }

    /// Record of `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<&DayMeta> {
        self.records.get(&date)
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// All records in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &DayMeta)> {
        self.records.iter().map(|(d, m)| (*d, m))
    }

    /// Records whose day intersects `[start, end]`, ordered by date.
    ///
    /// A `None` bound is open. Both bounds must be naive or both aware;
    /// aware bounds are compared against local midnights in `tz`.
    pub fn query(
        &self,
        start: Option<&Timestamp>,
        end: Option<&Timestamp>,
        tz: Tz,
    ) -> Result<Vec<(NaiveDate, DayMeta)>> {
        if let (Some(s), Some(e)) = (start, end) {
            ensure!(
                s.is_aware() == e.is_aware(),
                "cannot mix naive and aware bounds: {s} and {e}"
            );
        }
        let aware = start.or(end).is_some_and(Timestamp::is_aware);
        if aware {
            let start = start.and_then(Timestamp::as_instant).map(|t| t.with_timezone(&Utc));
            let end = end.and_then(Timestamp::as_instant).map(|t| t.with_timezone(&Utc));
            self.query_aware(start, end, tz)
        } else {
            let start = start.and_then(Timestamp::as_naive);
            let end = end.and_then(Timestamp::as_naive);
            self.query_naive(start, end)
        }
    }

    fn query_naive(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<(NaiveDate, DayMeta)>> {
        if let (Some(s), Some(e)) = (start, end) {
            ensure!(s <= e, "query start {s} is after end {e}");
        }
        // A naive day [d 00:00, d+1 00:00) meets [s, e] iff s.date() <= d <= e.date().
        let lo = start.map(|s| s.date());
        let hi = end.map(|e| e.date());
        Ok(self.records.range(lo, hi).map(|(d, m)| (*d, m.clone())).collect())
    }

    fn query_aware(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        tz: Tz,
    ) -> Result<Vec<(NaiveDate, DayMeta)>> {
        if let (Some(s), Some(e)) = (start, end) {
            ensure!(s <= e, "query start {s} is after end {e}");
        }
        // Candidates are the local dates of the bounds, widened by one day.
        let lo = start.and_then(|s| s.with_timezone(&tz).date_naive().checked_sub_days(Days::new(1)));
        let hi = end.and_then(|e| e.with_timezone(&tz).date_naive().checked_add_days(Days::new(1)));
        let mut out = Vec::new();
        for (date, meta) in self.records.range(lo, hi) {
            let (day_start, day_end) = local_day(*date, tz)?;
            let after_start = start.map_or(true, |s| day_end > s);
            let before_end = end.map_or(true, |e| day_start <= e);
            if after_start && before_end {
                out.push((*date, meta.clone()));
            }
        }
        Ok(out)
    }
}

/// First valid local instant of `date` in `tz`.
///
/// An ambiguous midnight takes the earlier instant; a midnight skipped by a
/// daylight-saving jump moves forward to the first local time that exists.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=24 * 4)
        .filter_map(|quarter| midnight.checked_add_signed(TimeDelta::minutes(15 * quarter)))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::InvalidArgument(format!("no local time exists on {date} in {tz}")))
}

/// The instants `[start, end)` spanned by `date` in `tz`.
pub fn local_day(date: NaiveDate, tz: Tz) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let next = date
        .succ_opt()
        .ok_or_else(|| Error::InvalidArgument(format!("no day after {date}")))?;
    Ok((local_midnight(date, tz)?, local_midnight(next, tz)?))
}
