//! # ecx-core
//!
//! Core types shared across the ecx workspace.
//!
//! This crate provides the error hierarchy, the parsing boundary that turns
//! strings and `chrono` values into dates, times and timestamps, the
//! [`Timestamp`] type used for metadata queries, and [`DateSeries`], the
//! ordered date-keyed container the other crates build on.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `ensure_consistent!` / `fail!` macros.
pub mod errors;

/// Date, time and timestamp parsing at the API boundary.
pub mod parsers;

/// Ordered date-keyed container.
pub mod series;

/// Naive or offset-aware timestamps.
pub mod timestamp;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use parsers::{AsDate, AsTime, AsTimestamp};
pub use series::DateSeries;
pub use timestamp::Timestamp;
