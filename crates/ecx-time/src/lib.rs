//! # ecx-time
//!
//! Date helpers, weekmasks, holiday rules, base calendar sources and expiry
//! date arithmetic.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// In-memory calendar built from explicit rules.
pub mod base_calendar;

/// `CalendarSource` trait.
pub mod calendar;

/// Built-in exchange calendars.
pub mod calendars;

/// Month arithmetic, n-th weekday and Easter.
pub mod date;

/// Nominal monthly and quarterly expiry dates.
pub mod expiry;

/// Recurring holiday rules and weekend observance.
pub mod holiday;

/// Regular trading weekdays.
pub mod weekmask;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use base_calendar::BaseCalendar;
pub use calendar::{CalendarSource, TimedDates, TimedRules};
pub use expiry::{ExpiryCycle, RawExpiry, QUARTERLY_MONTHS};
pub use holiday::{HolidayRule, Observance, RuleKind};
pub use weekmask::WeekMask;
