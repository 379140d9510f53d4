//! Process-wide calendar state with an explicit lifecycle.
//!
//! [`CalendarRegistry`] maps exchange keys to their base calendar source,
//! extension spec, changeset and metadata index. All state sits behind one
//! `Mutex`; every mutation invalidates the cached snapshot of the exchange it
//! touches so the next [`get_calendar`](CalendarRegistry::get_calendar)
//! rebuilds from current state.
//!
//! Boundary operations accept any date, time or timestamp representation
//! implementing [`AsDate`], [`AsTime`] or [`AsTimestamp`]; inputs are
//! normalized before any state changes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tracing::{debug, info};

use ecx_changes::{ChangeSet, ChangeSetDict, DaySpec, DayType};
use ecx_core::errors::{Error, Result};
use ecx_core::{AsDate, AsTime, AsTimestamp};
use ecx_time::calendar::CalendarSource;

use crate::augmented::AugmentedCalendar;
use crate::config::{ExtensionSpec, RegistryConfig};
use crate::metadata::{DayMeta, MetadataIndex};

#[derive(Debug, Clone, Default)]
struct ExchangeState {
    changes: ChangeSet,
    meta: MetadataIndex,
}

impl ExchangeState {
    fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.meta.is_empty()
    }
}

#[derive(Debug, Default)]
struct Inner {
    sources: BTreeMap<String, Arc<dyn CalendarSource>>,
    extensions: BTreeMap<String, ExtensionSpec>,
    states: BTreeMap<String, ExchangeState>,
    cache: BTreeMap<String, Arc<AugmentedCalendar>>,
}

impl Inner {
    fn ensure_known(&self, exchange: &str) -> Result<()> {
        if self.sources.contains_key(exchange) {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!("unknown exchange {exchange:?}")))
        }
    }
}

/// Registry of exchange calendars and their overrides.
#[derive(Debug)]
pub struct CalendarRegistry {
    strict: bool,
    inner: Mutex<Inner>,
}

impl Default for CalendarRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl CalendarRegistry {
    /// Registry with the given configuration and no calendars.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            strict: config.strict,
            inner: Mutex::new(Inner {
                extensions: config.extensions,
                ..Inner::default()
            }),
        }
    }

    /// Whether conflicting changeset operations are rejected.
    pub fn strict(&self) -> bool {
        self.strict
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` to the state of `exchange` and drop its cached snapshot.
    ///
    /// `f` must leave the state unchanged when it fails. Empty states are
    /// not kept.
    fn mutate<T>(
        &self,
        exchange: &str,
        f: impl FnOnce(&mut ExchangeState) -> Result<T>,
    ) -> Result<T> {
        let mut inner = self.lock();
        inner.ensure_known(exchange)?;
        let mut state = inner.states.remove(exchange).unwrap_or_default();
        let result = f(&mut state);
        if !state.is_empty() {
            inner.states.insert(exchange.to_owned(), state);
        }
        inner.cache.remove(exchange);
        result
    }

    fn read<T>(&self, exchange: &str, f: impl FnOnce(Option<&ExchangeState>) -> T) -> Result<T> {
        let inner = self.lock();
        inner.ensure_known(exchange)?;
        Ok(f(inner.states.get(exchange)))
    }

    // ── Registration ─────────────────────────────────────────────────────

    /// Install `source` under `exchange`, replacing any previous source.
    pub fn register_calendar<S: CalendarSource + 'static>(&self, exchange: &str, source: S) {
        let mut inner = self.lock();
        inner.sources.insert(exchange.to_owned(), Arc::new(source));
        inner.cache.remove(exchange);
        debug!(exchange, "calendar registered");
    }

    /// Set the extension spec of `exchange`.
    pub fn register_extension(&self, exchange: &str, spec: ExtensionSpec) -> Result<()> {
        spec.validate()?;
        let mut inner = self.lock();
        inner.extensions.insert(exchange.to_owned(), spec);
        inner.cache.remove(exchange);
        debug!(exchange, "extension registered");
        Ok(())
    }

    /// Registered exchange keys, sorted.
    pub fn exchanges(&self) -> Vec<String> {
        self.lock().sources.keys().cloned().collect()
    }

    // ── Changes ──────────────────────────────────────────────────────────

    /// Add a day of any type.
    pub fn add_day(&self, exchange: &str, day_type: DayType, spec: DaySpec) -> Result<()> {
        let strict = self.strict;
        self.mutate(exchange, |s| s.changes.add(day_type, spec, strict))
    }

    /// Add a holiday.
    pub fn add_holiday(&self, exchange: &str, date: impl AsDate, name: &str) -> Result<()> {
        let spec = DaySpec::new(date.as_date()?, name);
        self.add_day(exchange, DayType::Holiday, spec)
    }

    /// Add a special open at `time`.
    pub fn add_special_open(
        &self,
        exchange: &str,
        date: impl AsDate,
        time: impl AsTime,
        name: &str,
    ) -> Result<()> {
        let spec = DaySpec::with_time(date.as_date()?, name, time.as_time()?);
        self.add_day(exchange, DayType::SpecialOpen, spec)
    }

    /// Add a special close at `time`.
    pub fn add_special_close(
        &self,
        exchange: &str,
        date: impl AsDate,
        time: impl AsTime,
        name: &str,
    ) -> Result<()> {
        let spec = DaySpec::with_time(date.as_date()?, name, time.as_time()?);
        self.add_day(exchange, DayType::SpecialClose, spec)
    }

    /// Add a monthly expiry.
    pub fn add_monthly_expiry(&self, exchange: &str, date: impl AsDate, name: &str) -> Result<()> {
        let spec = DaySpec::new(date.as_date()?, name);
        self.add_day(exchange, DayType::MonthlyExpiry, spec)
    }

    /// Add a quarterly expiry.
    pub fn add_quarterly_expiry(&self, exchange: &str, date: impl AsDate, name: &str) -> Result<()> {
        let spec = DaySpec::new(date.as_date()?, name);
        self.add_day(exchange, DayType::QuarterlyExpiry, spec)
    }

    /// Remove `date` as `day_type`, or as every type when `None`.
    pub fn remove_day(
        &self,
        exchange: &str,
        day_type: Option<DayType>,
        date: impl AsDate,
    ) -> Result<()> {
        let date = date.as_date()?;
        let strict = self.strict;
        self.mutate(exchange, |s| s.changes.remove(day_type, date, strict))
    }

    /// Replace the changeset of `exchange` with `dict`.
    pub fn update_calendar(&self, exchange: &str, dict: &ChangeSetDict) -> Result<()> {
        self.mutate(exchange, |s| s.changes.merge_from_dict(dict))?;
        info!(exchange, "changeset replaced");
        Ok(())
    }

    /// Revert `date` to base calendar truth, dropping its metadata too when
    /// `include_meta` is set.
    pub fn reset_day(&self, exchange: &str, date: impl AsDate, include_meta: bool) -> Result<()> {
        let date = date.as_date()?;
        self.mutate(exchange, |s| {
            s.changes.clear_day(date);
            if include_meta {
                s.meta.remove(date);
            }
            Ok(())
        })
    }

    /// Drop every change and metadata record of `exchange`.
    pub fn reset_calendar(&self, exchange: &str) -> Result<()> {
        self.mutate(exchange, |s| {
            *s = ExchangeState::default();
            Ok(())
        })?;
        info!(exchange, "calendar reset");
        Ok(())
    }

    /// Drop every change and metadata record of every exchange.
    pub fn reset_all_calendars(&self) {
        let mut inner = self.lock();
        inner.states.clear();
        inner.cache.clear();
        info!("all calendars reset");
    }

    /// Independent copy of the changeset of `exchange`.
    pub fn get_changes_for_calendar(&self, exchange: &str) -> Result<ChangeSet> {
        self.read(exchange, |s| s.map(|s| s.changes.clone()).unwrap_or_default())
    }

    /// Independent copies of every non-empty changeset, keyed by exchange.
    pub fn get_changes_for_all_calendars(&self) -> BTreeMap<String, ChangeSet> {
        self.lock()
            .states
            .iter()
            .filter(|(_, s)| !s.changes.is_empty())
            .map(|(k, s)| (k.clone(), s.changes.clone()))
            .collect()
    }

    // ── Metadata ─────────────────────────────────────────────────────────

    /// Replace the record of `date`; `None` deletes it.
    pub fn set_meta(&self, exchange: &str, date: impl AsDate, meta: Option<DayMeta>) -> Result<()> {
        let date = date.as_date()?;
        self.mutate(exchange, |s| {
            match meta {
                Some(meta) => s.meta.set(date, meta),
                None => {
                    s.meta.remove(date);
                }
            }
            Ok(())
        })
    }

    /// Set the comment of `date`.
    pub fn set_comment(&self, exchange: &str, date: impl AsDate, comment: Option<&str>) -> Result<()> {
        let date = date.as_date()?;
        let comment = comment.map(str::to_owned);
        self.mutate(exchange, |s| {
            s.meta.set_comment(date, comment);
            Ok(())
        })
    }

    /// Set the tags of `date`.
    pub fn set_tags<S: Into<String>>(
        &self,
        exchange: &str,
        date: impl AsDate,
        tags: impl IntoIterator<Item = S>,
    ) -> Result<()> {
        let date = date.as_date()?;
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        self.mutate(exchange, |s| {
            s.meta.set_tags(date, tags);
            Ok(())
        })
    }

    /// Record of `date`, if any.
    pub fn get_meta(&self, exchange: &str, date: impl AsDate) -> Result<Option<DayMeta>> {
        let date = date.as_date()?;
        self.read(exchange, |s| s.and_then(|s| s.meta.get(date).cloned()))
    }

    /// Records of `exchange` whose day intersects `[start, end]`.
    ///
    /// Both bounds share one [`AsTimestamp`] type; `None` is open.
    pub fn query_meta<T: AsTimestamp>(
        &self,
        exchange: &str,
        start: Option<T>,
        end: Option<T>,
    ) -> Result<Vec<(NaiveDate, DayMeta)>> {
        let start = start.map(|s| s.as_timestamp()).transpose()?;
        let end = end.map(|e| e.as_timestamp()).transpose()?;
        let (start, end) = (start.as_ref(), end.as_ref());
        let inner = self.lock();
        let tz = inner
            .sources
            .get(exchange)
            .map(|s| s.tz())
            .ok_or_else(|| Error::InvalidArgument(format!("unknown exchange {exchange:?}")))?;
        match inner.states.get(exchange) {
            Some(s) => s.meta.query(start, end, tz),
            None => MetadataIndex::new().query(start, end, tz),
        }
    }

    // ── Snapshots ────────────────────────────────────────────────────────

    /// Augmented calendar of `exchange`, rebuilt if any state changed since
    /// the last call.
    pub fn get_calendar(&self, exchange: &str) -> Result<Arc<AugmentedCalendar>> {
        let mut inner = self.lock();
        if let Some(cal) = inner.cache.get(exchange) {
            return Ok(Arc::clone(cal));
        }
        let source = inner
            .sources
            .get(exchange)
            .cloned()
            .ok_or_else(|| Error::InvalidArgument(format!("unknown exchange {exchange:?}")))?;
        let ext = inner.extensions.get(exchange).cloned().unwrap_or_default();
        let state = inner.states.get(exchange).cloned().unwrap_or_default();
        let cal = Arc::new(AugmentedCalendar::build(
            source.as_ref(),
            &state.changes,
            &ext,
            &state.meta,
        )?);
        info!(exchange, changes = state.changes.len(), "augmented calendar built");
        inner.cache.insert(exchange.to_owned(), Arc::clone(&cal));
        Ok(cal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecx_time::calendars::xlon;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn registry() -> CalendarRegistry {
        let reg = CalendarRegistry::default();
        reg.register_calendar("XLON", xlon(date(2022, 1, 1), date(2023, 12, 31)).unwrap());
        reg
    }

    #[test]
    fn unknown_exchange_is_invalid_argument() {
        let reg = registry();
        assert!(matches!(
            reg.add_holiday("XXXX", "2023-01-02", "x"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(reg.get_calendar("XXXX"), Err(Error::InvalidArgument(_))));
        assert!(matches!(reg.get_meta("XXXX", "2023-01-02"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn malformed_input_leaves_state_untouched() {
        let reg = registry();
        assert!(matches!(
            reg.add_holiday("XLON", "2023-02-30", "x"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            reg.add_special_open("XLON", "2023-02-01", "25:00", "x"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(reg.get_changes_for_all_calendars().is_empty());
    }

    #[test]
    fn snapshots_are_cached_until_mutation() {
        let reg = registry();
        let a = reg.get_calendar("XLON").unwrap();
        let b = reg.get_calendar("XLON").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        reg.add_holiday("XLON", "2023-01-03", "Closed").unwrap();
        let c = reg.get_calendar("XLON").unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.day_type(date(2023, 1, 3)), None);
        assert_eq!(c.day_type(date(2023, 1, 3)), Some(DayType::Holiday));
    }

    #[test]
    fn empty_states_are_dropped() {
        let reg = registry();
        reg.add_holiday("XLON", date(2023, 1, 3), "Closed").unwrap();
        assert_eq!(reg.get_changes_for_all_calendars().len(), 1);
        reg.reset_day("XLON", date(2023, 1, 3), false).unwrap();
        assert!(reg.get_changes_for_all_calendars().is_empty());
        assert!(reg.get_changes_for_calendar("XLON").unwrap().is_empty());
    }

    #[test]
    fn strict_registry_rejects_retype() {
        let reg = CalendarRegistry::new(RegistryConfig {
            strict: true,
            ..RegistryConfig::default()
        });
        reg.register_calendar("XLON", xlon(date(2023, 1, 1), date(2023, 12, 31)).unwrap());
        assert!(reg.strict());
        reg.add_holiday("XLON", "2023-03-01", "Closed").unwrap();
        assert!(matches!(
            reg.add_special_close("XLON", "2023-03-01", "12:30", "Early"),
            Err(Error::Consistency(_))
        ));
        let cs = reg.get_changes_for_calendar("XLON").unwrap();
        assert_eq!(cs.added_type(date(2023, 3, 1)), Some(DayType::Holiday));
    }
}
