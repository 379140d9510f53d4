//! # ecx
//!
//! Exchange calendar extensions: a user-editable override layer on top of
//! base exchange calendars, derived expiry and last-trading-day calendars,
//! and per-date metadata.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on this crate rather than the individual
//! `ecx-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use ecx::calendar::CalendarRegistry;
//! use ecx::changes::DayType;
//! use ecx::time::calendars::xetr;
//!
//! # fn main() -> ecx::core::Result<()> {
//! let first = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
//! let last = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
//!
//! let registry = CalendarRegistry::default();
//! registry.register_calendar("XETR", xetr(first, last)?);
//! registry.add_holiday("XETR", "2023-03-17", "Closed")?;
//!
//! let cal = registry.get_calendar("XETR")?;
//! let march = NaiveDate::from_ymd_opt(2023, 3, 16).unwrap();
//! assert_eq!(cal.day_type(march), Some(DayType::QuarterlyExpiry));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Errors, parsing boundary, timestamps and date series.
pub use ecx_core as core;

/// Weekmasks, holiday rules, base calendars and expiry dates.
pub use ecx_time as time;

/// Day types and changesets.
pub use ecx_changes as changes;

/// Normalizer, session calculator, metadata and registry.
pub use ecx_calendar as calendar;
