//! Error types for the ecx workspace.
//!
//! Every fallible operation in the workspace returns [`Result`], backed by a
//! single `thiserror`-derived enum. The `ensure!`, `ensure_consistent!` and
//! `fail!` macros defined here shorten the common precondition checks.

use thiserror::Error;

/// The top-level error type used throughout the workspace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A changeset operation or import would violate the changeset
    /// invariants. The underlying state is left unchanged.
    #[error("inconsistent changeset: {0}")]
    Consistency(String),

    /// Malformed input: bad date or time, mixed timezone awareness,
    /// a day-type/time mismatch or an unknown exchange key.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested derived calendar is not available for this exchange.
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Shorthand `Result` type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return `Err(Error::InvalidArgument(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ecx_core::{ensure, errors::Error};
/// fn weekday(n: u8) -> ecx_core::errors::Result<u8> {
///     ensure!(n <= 6, "day of week must be in 0..=6, got {n}");
///     Ok(n)
/// }
/// assert!(weekday(4).is_ok());
/// assert!(matches!(weekday(7), Err(Error::InvalidArgument(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidArgument(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::Consistency(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ecx_core::{ensure_consistent, errors::Error};
/// fn disjoint(a: &[u32], b: &[u32]) -> ecx_core::errors::Result<()> {
///     ensure_consistent!(a.iter().all(|x| !b.contains(x)), "sets overlap");
///     Ok(())
/// }
/// assert!(disjoint(&[1], &[2]).is_ok());
/// assert!(matches!(disjoint(&[1], &[1]), Err(Error::Consistency(_))));
/// ```
#[macro_export]
macro_rules! ensure_consistent {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Consistency(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::NotSupported(...))` immediately.
///
/// # Example
/// ```
/// use ecx_core::{fail, errors::Error};
/// fn always_err() -> ecx_core::errors::Result<()> {
///     fail!("no expiry day configured for {}", "XNAS");
/// }
/// assert!(matches!(always_err(), Err(Error::NotSupported(_))));
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::NotSupported(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes() {
        let e = Error::Consistency("2023-01-02 added twice".into());
        assert_eq!(e.to_string(), "inconsistent changeset: 2023-01-02 added twice");
        let e = Error::InvalidArgument("bad date".into());
        assert_eq!(e.to_string(), "invalid argument: bad date");
        let e = Error::NotSupported("expiry".into());
        assert_eq!(e.to_string(), "not supported: expiry");
    }
}
