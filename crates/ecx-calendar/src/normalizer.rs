//! Applying a changeset to a base calendar.
//!
//! The base classification collects holidays, special opens and special
//! closes from the source's regular and ad-hoc rules within its bounds,
//! keeping every type a date carries. [`normalize`] strips removed types,
//! resolves what is left by precedence and applies additions on top, so an
//! added day always wins over a stale base entry.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use ecx_changes::{ChangeSet, DaySpec, DayType};
use ecx_core::DateSeries;
use ecx_time::calendar::{CalendarSource, TimedDates, TimedRules};

/// Name given to ad-hoc holidays.
pub const ADHOC_HOLIDAY: &str = "ad-hoc holiday";
/// Name given to ad-hoc special opens.
pub const ADHOC_SPECIAL_OPEN: &str = "ad-hoc special open";
/// Name given to ad-hoc special closes.
pub const ADHOC_SPECIAL_CLOSE: &str = "ad-hoc special close";

/// A date's type together with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedDay {
    /// Assigned type.
    pub day_type: DayType,
    /// Name, date and optional session time.
    pub spec: DaySpec,
}

/// Augmented classification of one exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    days: DateSeries<ClassifiedDay>,
    suppressed: BTreeMap<DayType, BTreeSet<NaiveDate>>,
}

impl Classification {
    /// Type of `date`, if any.
    pub fn day_type(&self, date: NaiveDate) -> Option<DayType> {
        self.days.get(&date).map(|d| d.day_type)
    }

    /// Classified entry of `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<&ClassifiedDay> {
        self.days.get(&date)
    }

    /// Every classified date in order.
    pub fn days(&self) -> &DateSeries<ClassifiedDay> {
        &self.days
    }

    /// Entries of one type, ascending by date.
    pub fn of_type(&self, day_type: DayType) -> impl Iterator<Item = &DaySpec> {
        self.days
            .iter()
            .filter(move |(_, d)| d.day_type == day_type)
            .map(|(_, d)| &d.spec)
    }

    /// Return `true` if derived days of `day_type` must not land on `date`.
    pub fn is_suppressed(&self, day_type: DayType, date: NaiveDate) -> bool {
        self.suppressed
            .get(&day_type)
            .is_some_and(|dates| dates.contains(&date))
    }
}

// ── Base classification ──────────────────────────────────────────────────────

/// Base special days of one exchange.
///
/// Every type a date carries in the source is kept, in precedence order
/// holiday, special open, special close. Precedence is only resolved by
/// [`normalize`], after removals, so stripping a holiday can expose a
/// special session on the same date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseDays {
    layers: DateSeries<Vec<ClassifiedDay>>,
}

impl BaseDays {
    /// Highest-precedence base entry of `date`.
    pub fn get(&self, date: &NaiveDate) -> Option<&ClassifiedDay> {
        self.layers.get(date).and_then(|days| days.first())
    }

    /// Return `true` if `date` carries any base type.
    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.layers.contains(date)
    }

    /// Every base entry of `date`, highest precedence first.
    pub fn layers(&self, date: NaiveDate) -> &[ClassifiedDay] {
        self.layers.get(&date).map_or(&[], Vec::as_slice)
    }

    /// Number of dates carrying a base type.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Return `true` if the source has no special days in its bounds.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

struct BaseEntry {
    spec: DaySpec,
    adhoc: bool,
}

fn insert_first(out: &mut DateSeries<BaseEntry>, spec: DaySpec, adhoc: bool) {
    if !out.contains(&spec.date) {
        out.insert(spec.date, BaseEntry { spec, adhoc });
    }
}

fn collect_holidays(source: &dyn CalendarSource) -> DateSeries<BaseEntry> {
    let (first, last) = source.bounds();
    let mut out = DateSeries::new();
    for rule in source.regular_holidays() {
        for date in rule.dates(first, last) {
            insert_first(&mut out, DaySpec::new(date, rule.name.clone()), false);
        }
    }
    for &date in source.adhoc_holidays() {
        if source.in_bounds(date) {
            insert_first(&mut out, DaySpec::new(date, ADHOC_HOLIDAY), true);
        }
    }
    out
}

fn collect_timed(
    source: &dyn CalendarSource,
    adhoc: &[TimedDates],
    regular: &[TimedRules],
    adhoc_name: &str,
) -> DateSeries<BaseEntry> {
    let (first, last) = source.bounds();
    let mut out = DateSeries::new();
    for group in adhoc {
        for &date in group.dates.iter().filter(|d| source.in_bounds(**d)) {
            insert_first(&mut out, DaySpec::with_time(date, adhoc_name, group.time), true);
        }
    }
    for group in regular {
        for rule in &group.rules {
            for date in rule.dates(first, last) {
                insert_first(
                    &mut out,
                    DaySpec::with_time(date, rule.name.clone(), group.time),
                    false,
                );
            }
        }
    }
    out
}

/// Collect the base calendar's special days.
///
/// Within a type the first rule wins. A date may carry several types; they
/// are kept side by side and resolved as holiday > special open > special
/// close once changes are applied.
pub fn base_classification(source: &dyn CalendarSource) -> BaseDays {
    let layers = [
        (DayType::Holiday, collect_holidays(source)),
        (
            DayType::SpecialOpen,
            collect_timed(
                source,
                source.special_opens_adhoc(),
                source.special_opens(),
                ADHOC_SPECIAL_OPEN,
            ),
        ),
        (
            DayType::SpecialClose,
            collect_timed(
                source,
                source.special_closes_adhoc(),
                source.special_closes(),
                ADHOC_SPECIAL_CLOSE,
            ),
        ),
    ];

    let mut days: DateSeries<Vec<ClassifiedDay>> = DateSeries::new();
    let mut adhoc_dates = BTreeSet::new();
    for (day_type, entries) in layers {
        for (date, BaseEntry { spec, adhoc }) in entries {
            let stacked = days.entry_or_default(date);
            if let Some(top) = stacked.first() {
                // Weekly closes on holidays are routine; ad-hoc clashes are not.
                if adhoc && adhoc_dates.contains(&date) {
                    warn!(
                        exchange = source.name(),
                        %date,
                        kept = %top.day_type,
                        shadowed = %day_type,
                        "overlapping ad-hoc special days"
                    );
                } else {
                    debug!(
                        exchange = source.name(),
                        %date,
                        kept = %top.day_type,
                        shadowed = %day_type,
                        "overlapping base special days"
                    );
                }
            }
            stacked.push(ClassifiedDay { day_type, spec });
            if adhoc {
                adhoc_dates.insert(date);
            }
        }
    }
    BaseDays { layers: days }
}

// ── Normalization ────────────────────────────────────────────────────────────

/// Apply `changes` on top of the base special days.
///
/// Removals strip their type from every layer of the date first; the
/// remaining highest-precedence layer becomes the date's type. Additions are
/// applied last, so an added date takes the added type and loses every other
/// one. Expiry removals are kept for the session calculator since expiries
/// are not part of the base.
pub fn normalize(base: &BaseDays, changes: &ChangeSet) -> Classification {
    let mut layers = base.layers.clone();
    let mut suppressed = BTreeMap::new();

    for day_type in DayType::ALL {
        let removed: BTreeSet<NaiveDate> = changes.removals(day_type).collect();
        if day_type.is_expiry() {
            if !removed.is_empty() {
                suppressed.insert(day_type, removed);
            }
            continue;
        }
        for date in removed {
            if let Some(stacked) = layers.get_mut(&date) {
                let before = stacked.len();
                stacked.retain(|d| d.day_type != day_type);
                if stacked.len() < before {
                    debug!(%date, %day_type, "stripping base day");
                }
            }
        }
    }

    let mut days: DateSeries<ClassifiedDay> = layers
        .into_iter()
        .filter_map(|(date, stacked)| stacked.into_iter().next().map(|top| (date, top)))
        .collect();

    for (day_type, spec) in changes.additions() {
        days.insert(
            spec.date,
            ClassifiedDay {
                day_type,
                spec: spec.clone(),
            },
        );
    }

    Classification { days, suppressed }
}
