//! # ecx-calendar
//!
//! Augmented exchange calendars. A base [`CalendarSource`] plus a
//! [`ChangeSet`] of overrides is normalized into one classification per
//! date; expiry days and last trading days of each month are derived from
//! it; per-date metadata is kept alongside. [`CalendarRegistry`] holds the
//! per-exchange state and hands out immutable [`AugmentedCalendar`]
//! snapshots.
//!
//! [`CalendarSource`]: ecx_time::CalendarSource
//! [`ChangeSet`]: ecx_changes::ChangeSet

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Immutable augmented calendar snapshots.
pub mod augmented;

/// Extension and registry configuration.
pub mod config;

/// Built-in per-exchange expiry table.
pub mod exchanges;

/// Per-date comments and tags.
pub mod metadata;

/// Base classification and changeset application.
pub mod normalizer;

/// Per-exchange state and snapshot cache.
pub mod registry;

/// Expiry and last-trading-day calculator.
pub mod sessions;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use augmented::AugmentedCalendar;
pub use config::{ExtensionSpec, RegistryConfig};
pub use exchanges::default_extensions;
pub use metadata::{DayMeta, MetadataIndex};
pub use normalizer::{base_classification, normalize, BaseDays, Classification, ClassifiedDay};
pub use registry::CalendarRegistry;
pub use sessions::SessionCalculator;
