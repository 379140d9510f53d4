//! `AugmentedCalendar` — an immutable snapshot of one exchange's calendar
//! with its changeset applied.
//!
//! The snapshot is computed once from the base source, the changeset, the
//! extension spec and the metadata index as they stand at build time. Later
//! changes to any of them are not observed; fetch a fresh snapshot instead.

use chrono::{NaiveDate, Weekday};
use chrono_tz::Tz;

use ecx_changes::{ChangeSet, DaySpec, DayType};
use ecx_core::errors::Result;
use ecx_core::{fail, AsTimestamp, DateSeries};
use ecx_time::calendar::CalendarSource;
use ecx_time::expiry::ExpiryCycle;
use ecx_time::WeekMask;

use crate::config::ExtensionSpec;
use crate::metadata::{DayMeta, MetadataIndex};
use crate::normalizer::{base_classification, normalize, Classification};
use crate::sessions::SessionCalculator;

#[derive(Debug, Clone, PartialEq, Eq)]
struct DerivedCalendars {
    monthly_expiries: DateSeries<DaySpec>,
    quarterly_expiries: DateSeries<DaySpec>,
    last_trading_days: DateSeries<DaySpec>,
    last_regular_trading_days: DateSeries<DaySpec>,
}

/// One exchange's calendar with overrides, derived calendars and metadata.
#[derive(Debug, Clone)]
pub struct AugmentedCalendar {
    name: String,
    tz: Tz,
    weekmask: WeekMask,
    bounds: (NaiveDate, NaiveDate),
    classification: Classification,
    derived: Option<DerivedCalendars>,
    meta: MetadataIndex,
}

impl AugmentedCalendar {
    /// Build a snapshot.
    ///
    /// Derived calendars are computed eagerly when `ext` has an expiry
    /// weekday; otherwise their accessors return `NotSupported`.
    pub fn build(
        source: &dyn CalendarSource,
        changes: &ChangeSet,
        ext: &ExtensionSpec,
        meta: &MetadataIndex,
    ) -> Result<Self> {
        ext.validate()?;
        let base = base_classification(source);
        let classification = normalize(&base, changes);

        let name = source.name().to_owned();
        let weekmask = source.weekmask();
        let bounds = source.bounds();
        let derived = if ext.expiry_weekday().is_some() {
            let calc = SessionCalculator::new(&name, weekmask, bounds, &classification);
            Some(DerivedCalendars {
                monthly_expiries: calc.expiries(ext, ExpiryCycle::Monthly)?,
                quarterly_expiries: calc.expiries(ext, ExpiryCycle::Quarterly)?,
                last_trading_days: calc.last_trading_days(ext)?,
                last_regular_trading_days: calc.last_regular_trading_days(ext)?,
            })
        } else {
            None
        };

        Ok(Self {
            tz: source.tz(),
            weekmask,
            bounds,
            classification,
            derived,
            meta: meta.clone(),
            name,
        })
    }

    fn calculator(&self) -> SessionCalculator<'_> {
        SessionCalculator::new(&self.name, self.weekmask, self.bounds, &self.classification)
    }

    fn derived(&self) -> Result<&DerivedCalendars> {
        match &self.derived {
            Some(derived) => Ok(derived),
            None => fail!("{}: no expiry weekday configured", self.name),
        }
    }

    // ── Inspectors ───────────────────────────────────────────────────────

    /// Exchange name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exchange timezone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Regular trading weekdays.
    pub fn weekmask(&self) -> WeekMask {
        self.weekmask
    }

    /// Non-trading weekdays.
    pub fn weekend_days(&self) -> Vec<Weekday> {
        self.weekmask.weekend_days()
    }

    /// Inclusive first and last date.
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        self.bounds
    }

    /// Type of `date`, including computed expiries.
    pub fn day_type(&self, date: NaiveDate) -> Option<DayType> {
        if let Some(t) = self.classification.day_type(date) {
            return Some(t);
        }
        let derived = self.derived.as_ref()?;
        if derived.monthly_expiries.contains(&date) {
            Some(DayType::MonthlyExpiry)
        } else if derived.quarterly_expiries.contains(&date) {
            Some(DayType::QuarterlyExpiry)
        } else {
            None
        }
    }

    /// Name, date and time of `date` if it has a type.
    pub fn special_day(&self, date: NaiveDate) -> Option<&DaySpec> {
        if let Some(day) = self.classification.get(date) {
            return Some(&day.spec);
        }
        let derived = self.derived.as_ref()?;
        derived
            .monthly_expiries
            .get(&date)
            .or_else(|| derived.quarterly_expiries.get(&date))
    }

    /// Holidays, ascending.
    pub fn holidays(&self) -> Vec<&DaySpec> {
        self.classification.of_type(DayType::Holiday).collect()
    }

    /// Special opens, ascending.
    pub fn special_opens(&self) -> Vec<&DaySpec> {
        self.classification.of_type(DayType::SpecialOpen).collect()
    }

    /// Special closes, ascending.
    pub fn special_closes(&self) -> Vec<&DaySpec> {
        self.classification.of_type(DayType::SpecialClose).collect()
    }

    /// Return `true` if `date` is a trading session.
    pub fn is_session(&self, date: NaiveDate) -> bool {
        self.calculator().is_session(date)
    }

    /// Sessions in `[start, end]`.
    pub fn sessions(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        self.calculator().sessions(start, end)
    }

    // ── Derived calendars ────────────────────────────────────────────────

    /// Monthly expiry days.
    pub fn monthly_expiries(&self) -> Result<&DateSeries<DaySpec>> {
        Ok(&self.derived()?.monthly_expiries)
    }

    /// Quarterly expiry days.
    pub fn quarterly_expiries(&self) -> Result<&DateSeries<DaySpec>> {
        Ok(&self.derived()?.quarterly_expiries)
    }

    /// Last trading day of each month.
    pub fn last_trading_days_of_month(&self) -> Result<&DateSeries<DaySpec>> {
        Ok(&self.derived()?.last_trading_days)
    }

    /// Last regular trading day of each month.
    pub fn last_regular_trading_days_of_month(&self) -> Result<&DateSeries<DaySpec>> {
        Ok(&self.derived()?.last_regular_trading_days)
    }

    // ── Metadata ─────────────────────────────────────────────────────────

    /// Metadata records whose day intersects `[start, end]`.
    ///
    /// Bounds may be anything implementing [`AsTimestamp`]; pass
    /// `None::<Timestamp>` for an unbounded query.
    pub fn meta<T: AsTimestamp>(
        &self,
        start: Option<T>,
        end: Option<T>,
    ) -> Result<Vec<(NaiveDate, DayMeta)>> {
        let start = start.map(|s| s.as_timestamp()).transpose()?;
        let end = end.map(|e| e.as_timestamp()).transpose()?;
        self.meta.query(start.as_ref(), end.as_ref(), self.tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use ecx_core::errors::Error;
    use ecx_time::calendars::xetr;
    use ecx_time::{BaseCalendar, HolidayRule};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn build(changes: &ChangeSet, ext: &ExtensionSpec) -> AugmentedCalendar {
        let source = xetr(date(2023, 1, 1), date(2023, 12, 31)).unwrap();
        AugmentedCalendar::build(&source, changes, ext, &MetadataIndex::new()).unwrap()
    }

    #[test]
    fn plain_snapshot() {
        let cal = build(&ChangeSet::new(), &ExtensionSpec::with_expiry(4));
        assert_eq!(cal.name(), "XETR");
        assert_eq!(cal.tz(), Tz::Europe__Berlin);
        assert_eq!(cal.weekend_days(), vec![Weekday::Sat, Weekday::Sun]);
        assert_eq!(cal.day_type(date(2023, 12, 25)), Some(DayType::Holiday));
        assert_eq!(cal.day_type(date(2023, 3, 17)), Some(DayType::QuarterlyExpiry));
        assert_eq!(cal.day_type(date(2023, 4, 21)), Some(DayType::MonthlyExpiry));
        assert_eq!(cal.special_day(date(2023, 4, 21)).unwrap().name, "monthly expiry");
        assert!(!cal.is_session(date(2023, 4, 7)));
        assert!(cal.is_session(date(2023, 4, 6)));
    }

    #[test]
    fn added_special_open_shows_up() {
        let mut cs = ChangeSet::new();
        let t = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
        cs.add(DayType::SpecialOpen, DaySpec::with_time(date(2023, 12, 27), "Late open", t), false)
            .unwrap();
        let cal = build(&cs, &ExtensionSpec::with_expiry(4));
        assert_eq!(cal.special_opens().len(), 1);
        assert_eq!(cal.special_opens()[0].time, Some(t));
        assert!(cal.is_session(date(2023, 12, 27)));
    }

    #[test]
    fn removed_holiday_falls_back_to_friday_close() {
        let t = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        let source = BaseCalendar::new("TEST", Tz::UTC, date(2023, 1, 1), date(2023, 12, 31))
            .unwrap()
            .with_adhoc_holidays([date(2023, 3, 3)])
            .with_special_close(t, HolidayRule::weekly("Friday close", Weekday::Fri));
        let mut cs = ChangeSet::new();
        cs.remove(Some(DayType::Holiday), date(2023, 3, 3), false).unwrap();
        let cal = AugmentedCalendar::build(&source, &cs, &ExtensionSpec::default(), &MetadataIndex::new())
            .unwrap();
        assert_eq!(cal.day_type(date(2023, 3, 3)), Some(DayType::SpecialClose));
        assert_eq!(cal.special_day(date(2023, 3, 3)).unwrap().time, Some(t));
        assert!(cal.is_session(date(2023, 3, 3)));
    }

    #[test]
    fn derived_calendars_need_a_weekday() {
        let cal = build(&ChangeSet::new(), &ExtensionSpec::default());
        assert!(matches!(cal.monthly_expiries(), Err(Error::NotSupported(_))));
        assert!(matches!(cal.quarterly_expiries(), Err(Error::NotSupported(_))));
        assert!(matches!(cal.last_trading_days_of_month(), Err(Error::NotSupported(_))));
        assert!(matches!(cal.last_regular_trading_days_of_month(), Err(Error::NotSupported(_))));
        assert_eq!(cal.day_type(date(2023, 3, 17)), None);
    }

    #[test]
    fn invalid_extension_is_rejected() {
        let source = xetr(date(2023, 1, 1), date(2023, 12, 31)).unwrap();
        let ext = ExtensionSpec::with_expiry(8);
        assert!(matches!(
            AugmentedCalendar::build(&source, &ChangeSet::new(), &ext, &MetadataIndex::new()),
            Err(Error::InvalidArgument(_))
        ));
    }
}
