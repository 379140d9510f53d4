//! `ChangeSet` — pending additions and removals of special days for one
//! exchange.
//!
//! For each [`DayType`] a changeset holds the days to add (date → payload)
//! and the dates to remove. It maintains two invariants:
//!
//! * for each type, the added and removed dates are disjoint;
//! * no date is added under more than one type.
//!
//! Every mutating call is atomic: on error the changeset is unchanged.
//! In non-strict mode conflicting entries are silently superseded by the
//! latest call; in strict mode a conflict is an [`Error::Consistency`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ecx_core::errors::{Error, Result};
use ecx_core::ensure_consistent;

use crate::day_spec::DaySpec;
use crate::day_type::DayType;
use crate::dict::{dict_from_json_str, dict_to_json_string, ChangeSetDict, DayEntry, TypeChangesDict};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TypeChanges {
    add: BTreeMap<NaiveDate, DaySpec>,
    remove: BTreeSet<NaiveDate>,
}

impl TypeChanges {
    fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Pending changes to a base calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChangeSetDict", into = "ChangeSetDict")]
pub struct ChangeSet {
    changes: [TypeChanges; 5],
}

impl ChangeSet {
    /// An empty changeset.
    pub fn new() -> Self {
        Self::default()
    }

    fn of(&self, day_type: DayType) -> &TypeChanges {
        &self.changes[day_type.index()]
    }

    fn of_mut(&mut self, day_type: DayType) -> &mut TypeChanges {
        &mut self.changes[day_type.index()]
    }

    // ── Mutators ─────────────────────────────────────────────────────────

    /// Add `spec` under `day_type`.
    ///
    /// Non-strict: the date is dropped from every other type's additions and
    /// from this type's removals first. Strict: either of those is a
    /// consistency error. Re-adding under the same type replaces the payload.
    pub fn add(&mut self, day_type: DayType, spec: DaySpec, strict: bool) -> Result<()> {
        spec.validate_for(day_type)?;
        let date = spec.date;
        if strict {
            if let Some(other) = self.added_type(date).filter(|t| *t != day_type) {
                return Err(Error::Consistency(format!(
                    "cannot add {date} as {day_type}: already added as {other}"
                )));
            }
            ensure_consistent!(
                !self.of(day_type).remove.contains(&date),
                "cannot add {date} as {day_type}: date is marked for removal"
            );
        } else {
            for t in DayType::ALL.into_iter().filter(|t| *t != day_type) {
                if self.of_mut(t).add.remove(&date).is_some() {
                    debug!(%date, from = %t, to = %day_type, "superseded pending addition");
                }
            }
            self.of_mut(day_type).remove.remove(&date);
        }
        debug!(%date, %day_type, name = %spec.name, "add day");
        self.of_mut(day_type).add.insert(date, spec);
        Ok(())
    }

    /// Mark `date` for removal under `day_type`, or under every type if
    /// `None`.
    ///
    /// A pending addition of the same date and type is cancelled. In strict
    /// mode such a pending addition is a consistency error instead.
    pub fn remove(&mut self, day_type: Option<DayType>, date: NaiveDate, strict: bool) -> Result<()> {
        let types: Vec<DayType> = match day_type {
            Some(t) => vec![t],
            None => DayType::ALL.to_vec(),
        };
        if strict {
            if let Some(t) = types.iter().find(|t| self.of(**t).add.contains_key(&date)) {
                return Err(Error::Consistency(format!(
                    "cannot remove {date}: pending addition as {t}"
                )));
            }
        }
        for t in types {
            let changes = self.of_mut(t);
            changes.add.remove(&date);
            changes.remove.insert(date);
        }
        match day_type {
            Some(t) => debug!(%date, day_type = %t, "remove day"),
            None => debug!(%date, "remove day (all types)"),
        }
        Ok(())
    }

    /// Drop every pending change for `date`.
    pub fn clear_day(&mut self, date: NaiveDate) {
        for changes in &mut self.changes {
            changes.add.remove(&date);
            changes.remove.remove(&date);
        }
        debug!(%date, "clear day");
    }

    /// Drop every pending change.
    pub fn clear(&mut self) {
        self.changes = Default::default();
    }

    // ── Inspectors ───────────────────────────────────────────────────────

    /// Whether there are no pending changes.
    pub fn is_empty(&self) -> bool {
        self.changes.iter().all(TypeChanges::is_empty)
    }

    /// Number of distinct dates touched.
    pub fn len(&self) -> usize {
        self.all_days().len()
    }

    /// Check both changeset invariants.
    pub fn is_consistent(&self) -> bool {
        let disjoint = self
            .changes
            .iter()
            .all(|c| c.add.keys().all(|d| !c.remove.contains(d)));
        let mut seen = BTreeSet::new();
        let unique = self
            .changes
            .iter()
            .flat_map(|c| c.add.keys())
            .all(|d| seen.insert(*d));
        disjoint && unique
    }

    /// The type under which `date` is added, if any.
    pub fn added_type(&self, date: NaiveDate) -> Option<DayType> {
        DayType::ALL
            .into_iter()
            .find(|t| self.of(*t).add.contains_key(&date))
    }

    /// The pending addition of `date` under `day_type`.
    pub fn added(&self, day_type: DayType, date: NaiveDate) -> Option<&DaySpec> {
        self.of(day_type).add.get(&date)
    }

    /// Whether `date` is marked for removal under `day_type`.
    pub fn is_removed(&self, day_type: DayType, date: NaiveDate) -> bool {
        self.of(day_type).remove.contains(&date)
    }

    /// Pending additions of one type, ascending by date.
    pub fn additions_of(&self, day_type: DayType) -> impl Iterator<Item = &DaySpec> {
        self.of(day_type).add.values()
    }

    /// All pending additions, ordered by type then date.
    pub fn additions(&self) -> impl Iterator<Item = (DayType, &DaySpec)> {
        DayType::ALL
            .into_iter()
            .flat_map(move |t| self.of(t).add.values().map(move |s| (t, s)))
    }

    /// Pending removals of one type, ascending.
    pub fn removals(&self, day_type: DayType) -> impl Iterator<Item = NaiveDate> + '_ {
        self.of(day_type).remove.iter().copied()
    }

    /// Every date touched by an addition or removal.
    pub fn all_days(&self) -> BTreeSet<NaiveDate> {
        self.changes
            .iter()
            .flat_map(|c| c.add.keys().chain(c.remove.iter()))
            .copied()
            .collect()
    }

    // ── Dictionary import/export ─────────────────────────────────────────

    /// Export to the wire dictionary. Types without changes are omitted.
    pub fn to_dict(&self) -> ChangeSetDict {
        DayType::ALL
            .into_iter()
            .filter(|t| !self.of(*t).is_empty())
            .map(|t| {
                let c = self.of(t);
                let dict = TypeChangesDict {
                    add: c.add.values().map(DayEntry::from).collect(),
                    remove: c.remove.iter().copied().collect(),
                };
                (t, dict)
            })
            .collect()
    }

    /// Build a changeset from the wire dictionary.
    ///
    /// Payload/type mismatches are [`Error::InvalidArgument`]; a date added
    /// twice, added under two types, or both added and removed under one
    /// type is an [`Error::Consistency`].
    pub fn from_dict(dict: &ChangeSetDict) -> Result<Self> {
        let mut cs = ChangeSet::new();
        for (&day_type, entries) in dict {
            let changes = cs.of_mut(day_type);
            for entry in &entries.add {
                let spec = DaySpec::from(entry.clone());
                spec.validate_for(day_type)?;
                ensure_consistent!(
                    changes.add.insert(spec.date, spec).is_none(),
                    "{} added twice as {day_type}",
                    entry.date
                );
            }
            changes.remove.extend(entries.remove.iter().copied());
        }
        ensure_consistent!(cs.is_consistent(), "imported changes violate changeset invariants");
        Ok(cs)
    }

    /// Replace this changeset wholesale with the contents of `dict`.
    ///
    /// On error the current contents are kept.
    pub fn merge_from_dict(&mut self, dict: &ChangeSetDict) -> Result<()> {
        *self = ChangeSet::from_dict(dict)?;
        debug!(days = self.len(), "replaced changeset from dictionary");
        Ok(())
    }

    /// Render as JSON in the wire dictionary schema.
    pub fn to_json_string(&self) -> Result<String> {
        dict_to_json_string(&self.to_dict())
    }

    /// Parse from JSON in the wire dictionary schema.
    pub fn from_json_str(s: &str) -> Result<Self> {
        ChangeSet::from_dict(&dict_from_json_str(s)?)
    }
}

impl TryFrom<ChangeSetDict> for ChangeSet {
    type Error = Error;

    fn try_from(dict: ChangeSetDict) -> Result<Self> {
        ChangeSet::from_dict(&dict)
    }
}

impl From<ChangeSet> for ChangeSetDict {
    fn from(cs: ChangeSet) -> Self {
        cs.to_dict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holiday(d: NaiveDate) -> DaySpec {
        DaySpec::new(d, "Holiday")
    }

    fn special_open(d: NaiveDate) -> DaySpec {
        DaySpec::with_time(d, "Special Open", NaiveTime::from_hms_opt(11, 0, 0).unwrap())
    }

    #[test]
    fn empty_changeset() {
        let cs = ChangeSet::new();
        assert!(cs.is_empty());
        assert_eq!(cs.len(), 0);
        assert!(cs.is_consistent());
        assert!(cs.to_dict().is_empty());
    }

    #[test]
    fn add_then_readd_replaces_payload() {
        let mut cs = ChangeSet::new();
        let d = date(2023, 1, 2);
        cs.add(DayType::Holiday, holiday(d), true).unwrap();
        cs.add(DayType::Holiday, DaySpec::new(d, "Renamed"), true).unwrap();
        assert_eq!(cs.added(DayType::Holiday, d).unwrap().name, "Renamed");
        assert_eq!(cs.len(), 1);
    }

    #[test]
    fn non_strict_retype() {
        let mut cs = ChangeSet::new();
        let d = date(2022, 12, 27);
        cs.add(DayType::Holiday, holiday(d), false).unwrap();
        cs.add(DayType::SpecialOpen, special_open(d), false).unwrap();
        assert_eq!(cs.added_type(d), Some(DayType::SpecialOpen));
        assert!(cs.added(DayType::Holiday, d).is_none());
        assert!(cs.is_consistent());
    }

    #[test]
    fn strict_retype_fails_and_leaves_state() {
        let mut cs = ChangeSet::new();
        let d = date(2022, 12, 27);
        cs.add(DayType::Holiday, holiday(d), true).unwrap();
        let before = cs.clone();
        let err = cs.add(DayType::SpecialOpen, special_open(d), true);
        assert!(matches!(err, Err(Error::Consistency(_))));
        assert_eq!(cs, before);
    }

    #[test]
    fn add_cancels_same_type_removal() {
        let mut cs = ChangeSet::new();
        let d = date(2023, 1, 2);
        cs.remove(Some(DayType::Holiday), d, false).unwrap();
        assert!(cs.is_removed(DayType::Holiday, d));
        cs.add(DayType::Holiday, holiday(d), false).unwrap();
        assert!(!cs.is_removed(DayType::Holiday, d));
        assert!(cs.added(DayType::Holiday, d).is_some());
    }

    #[test]
    fn strict_add_after_removal_fails() {
        let mut cs = ChangeSet::new();
        let d = date(2023, 1, 2);
        cs.remove(None, d, true).unwrap();
        assert!(matches!(
            cs.add(DayType::Holiday, holiday(d), true),
            Err(Error::Consistency(_))
        ));
    }

    #[test]
    fn remove_cancels_addition() {
        let mut cs = ChangeSet::new();
        let d = date(2023, 1, 2);
        cs.add(DayType::Holiday, holiday(d), false).unwrap();
        cs.remove(Some(DayType::Holiday), d, false).unwrap();
        assert!(cs.added(DayType::Holiday, d).is_none());
        assert!(cs.is_removed(DayType::Holiday, d));
    }

    #[test]
    fn strict_remove_of_pending_addition_fails() {
        let mut cs = ChangeSet::new();
        let d = date(2023, 1, 2);
        cs.add(DayType::Holiday, holiday(d), false).unwrap();
        assert!(matches!(
            cs.remove(Some(DayType::Holiday), d, true),
            Err(Error::Consistency(_))
        ));
        assert!(matches!(cs.remove(None, d, true), Err(Error::Consistency(_))));
        // A different type is fine.
        cs.remove(Some(DayType::SpecialClose), d, true).unwrap();
        assert!(cs.is_consistent());
    }

    #[test]
    fn untyped_remove_hits_every_type() {
        let mut cs = ChangeSet::new();
        let d = date(2023, 1, 2);
        cs.add(DayType::SpecialOpen, special_open(d), false).unwrap();
        cs.remove(None, d, false).unwrap();
        for t in DayType::ALL {
            assert!(cs.is_removed(t, d));
        }
        assert!(cs.added_type(d).is_none());
    }

    #[test]
    fn time_mismatch_is_invalid_argument() {
        let mut cs = ChangeSet::new();
        let d = date(2023, 1, 2);
        assert!(matches!(
            cs.add(DayType::SpecialOpen, holiday(d), false),
            Err(Error::InvalidArgument(_))
        ));
        assert!(cs.is_empty());
    }

    #[test]
    fn clear_day_reverts_date() {
        let mut cs = ChangeSet::new();
        cs.add(DayType::Holiday, holiday(date(2023, 1, 2)), false).unwrap();
        cs.remove(None, date(2023, 1, 3), false).unwrap();
        cs.clear_day(date(2023, 1, 3));
        assert_eq!(cs.all_days().into_iter().collect::<Vec<_>>(), vec![date(2023, 1, 2)]);
        cs.clear();
        assert!(cs.is_empty());
    }

    #[test]
    fn additions_are_ordered_by_type_then_date() {
        let mut cs = ChangeSet::new();
        cs.add(DayType::SpecialOpen, special_open(date(2023, 1, 1)), false).unwrap();
        cs.add(DayType::Holiday, holiday(date(2023, 2, 1)), false).unwrap();
        cs.add(DayType::Holiday, holiday(date(2023, 1, 5)), false).unwrap();
        let order: Vec<_> = cs.additions().map(|(t, s)| (t, s.date)).collect();
        assert_eq!(
            order,
            vec![
                (DayType::Holiday, date(2023, 1, 5)),
                (DayType::Holiday, date(2023, 2, 1)),
                (DayType::SpecialOpen, date(2023, 1, 1)),
            ]
        );
    }

    #[test]
    fn import_rejects_cross_type_duplicates() {
        let json = r#"{
            "holiday": {"add": [{"date": "2020-01-01", "value": {"name": "Holiday"}}]},
            "monthly_expiry": {"add": [{"date": "2020-01-01", "value": {"name": "Expiry"}}]}
        }"#;
        assert!(matches!(ChangeSet::from_json_str(json), Err(Error::Consistency(_))));
    }

    #[test]
    fn import_rejects_add_and_remove_same_type() {
        let json = r#"{"holiday": {"add": [{"date": "2020-01-01", "value": {"name": "Holiday"}}],
                                   "remove": ["2020-01-01"]}}"#;
        assert!(matches!(ChangeSet::from_json_str(json), Err(Error::Consistency(_))));
    }

    #[test]
    fn import_rejects_duplicate_addition() {
        let json = r#"{"holiday": {"add": [{"date": "2020-01-01", "value": {"name": "A"}},
                                           {"date": "2020-01-01", "value": {"name": "B"}}]}}"#;
        assert!(matches!(ChangeSet::from_json_str(json), Err(Error::Consistency(_))));
    }

    #[test]
    fn import_rejects_missing_time() {
        let json = r#"{"special_close": {"add": [{"date": "2020-01-01", "value": {"name": "x"}}]}}"#;
        assert!(matches!(ChangeSet::from_json_str(json), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn failed_merge_keeps_prior_state() {
        let mut cs = ChangeSet::new();
        cs.add(DayType::Holiday, holiday(date(2023, 1, 2)), false).unwrap();
        let before = cs.clone();
        let bad = dict_from_json_str(
            r#"{"holiday": {"add": [{"date": "2020-01-01", "value": {"name": "Holiday"}}],
                            "remove": ["2020-01-01"]}}"#,
        )
        .unwrap();
        assert!(cs.merge_from_dict(&bad).is_err());
        assert_eq!(cs, before);
    }

    #[test]
    fn merge_replaces_wholesale() {
        let mut cs = ChangeSet::new();
        cs.add(DayType::Holiday, holiday(date(2023, 1, 2)), false).unwrap();
        let dict = dict_from_json_str(r#"{"holiday": {"remove": ["2020-01-02"]}}"#).unwrap();
        cs.merge_from_dict(&dict).unwrap();
        assert!(cs.added(DayType::Holiday, date(2023, 1, 2)).is_none());
        assert!(cs.is_removed(DayType::Holiday, date(2020, 1, 2)));
    }

    #[test]
    fn serde_uses_dictionary_schema() {
        let mut cs = ChangeSet::new();
        cs.add(DayType::SpecialOpen, special_open(date(2023, 1, 4)), false).unwrap();
        let json = serde_json::to_string(&cs).unwrap();
        assert_eq!(
            json,
            r#"{"special_open":{"add":[{"date":"2023-01-04","value":{"name":"Special Open","time":"11:00:00"}}],"remove":[]}}"#
        );
        let back: ChangeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cs);
    }
}
