//! Ordered date-keyed container.
//!
//! `DateSeries<V>` is a thin wrapper over `BTreeMap<NaiveDate, V>` that adds
//! inclusive range queries with open ends. Day classifications, holiday
//! lists and metadata all live in one.

use std::collections::BTreeMap;
use std::ops::Bound;

use chrono::NaiveDate;

/// A date-indexed map iterated in ascending date order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSeries<V> {
    data: BTreeMap<NaiveDate, V>,
}

impl<V> Default for DateSeries<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(NaiveDate, V)> for DateSeries<V> {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, V)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<V> IntoIterator for DateSeries<V> {
    type Item = (NaiveDate, V);
    type IntoIter = std::collections::btree_map::IntoIter<NaiveDate, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<V> DateSeries<V> {
    /// Create an empty series.
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    // ── Inspectors ───────────────────────────────────────────────────────

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The earliest date, or `None` if empty.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.data.keys().next().copied()
    }

    /// The latest date, or `None` if empty.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.data.keys().next_back().copied()
    }

    // ── Element access ───────────────────────────────────────────────────

    /// Look up a value by date.
    pub fn get(&self, date: &NaiveDate) -> Option<&V> {
        self.data.get(date)
    }

    /// Mutable lookup by date.
    pub fn get_mut(&mut self, date: &NaiveDate) -> Option<&mut V> {
        self.data.get_mut(date)
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, date: NaiveDate, value: V) -> Option<V> {
        self.data.insert(date, value)
    }

    /// Remove an entry, returning its value if present.
    pub fn remove(&mut self, date: &NaiveDate) -> Option<V> {
        self.data.remove(date)
    }

    /// Whether a date is present.
    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.data.contains_key(date)
    }

    /// Get the value for `date`, inserting `V::default()` first if absent.
    pub fn entry_or_default(&mut self, date: NaiveDate) -> &mut V
    where
        V: Default,
    {
        self.data.entry(date).or_default()
    }

    // ── Bulk access ──────────────────────────────────────────────────────

    /// Iterate over `(&date, &value)` in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&NaiveDate, &V)> {
        self.data.iter()
    }

    /// All dates in ascending order.
    pub fn dates(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.data.keys().copied()
    }

    /// Entries with `start <= date <= end`. A `None` bound is open.
    pub fn range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> impl DoubleEndedIterator<Item = (&NaiveDate, &V)> {
        let lo = start.map_or(Bound::Unbounded, Bound::Included);
        let hi = end.map_or(Bound::Unbounded, Bound::Included);
        // BTreeMap::range panics on an inverted range.
        let (lo, hi) = match (start, end) {
            (Some(s), Some(e)) if s > e => (Bound::Included(s), Bound::Excluded(s)),
            _ => (lo, hi),
        };
        self.data.range((lo, hi))
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Access the underlying `BTreeMap`.
    pub fn as_map(&self) -> &BTreeMap<NaiveDate, V> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> DateSeries<&'static str> {
        [
            (date(2023, 3, 17), "c"),
            (date(2023, 1, 2), "a"),
            (date(2023, 2, 10), "b"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn empty_construction() {
        let s: DateSeries<u8> = DateSeries::new();
        assert!(s.is_empty());
        assert!(s.first_date().is_none());
        assert!(s.last_date().is_none());
    }

    #[test]
    fn sorted_iteration() {
        let s = sample();
        let dates: Vec<_> = s.dates().collect();
        assert_eq!(dates, vec![date(2023, 1, 2), date(2023, 2, 10), date(2023, 3, 17)]);
        assert_eq!(s.first_date(), Some(date(2023, 1, 2)));
        assert_eq!(s.last_date(), Some(date(2023, 3, 17)));
    }

    #[test]
    fn closed_and_open_ranges() {
        let s = sample();
        let mid: Vec<_> = s
            .range(Some(date(2023, 1, 3)), Some(date(2023, 3, 17)))
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(mid, vec!["b", "c"]);
        assert_eq!(s.range(None, Some(date(2023, 2, 10))).count(), 2);
        assert_eq!(s.range(Some(date(2023, 2, 11)), None).count(), 1);
        assert_eq!(s.range(None, None).count(), 3);
    }

    #[test]
    fn inverted_range_is_empty() {
        let s = sample();
        assert_eq!(s.range(Some(date(2023, 3, 1)), Some(date(2023, 1, 1))).count(), 0);
    }

    #[test]
    fn overwrite_and_remove() {
        let mut s = sample();
        assert_eq!(s.insert(date(2023, 1, 2), "z"), Some("a"));
        assert_eq!(s.remove(&date(2023, 1, 2)), Some("z"));
        assert!(!s.contains(&date(2023, 1, 2)));
        assert_eq!(s.len(), 2);
    }
}
