//! # ecx-changes
//!
//! The override layer: day types, day specs and the per-exchange
//! [`ChangeSet`] of pending additions and removals, with its dictionary wire
//! format.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Pending additions and removals.
pub mod changeset;

/// Payload of an added day.
pub mod day_spec;

/// Special-day categories.
pub mod day_type;

/// Dictionary wire format.
pub mod dict;

pub use changeset::ChangeSet;
pub use day_spec::DaySpec;
pub use day_type::DayType;
pub use dict::{ChangeSetDict, DayEntry, DayValue, TypeChangesDict};
