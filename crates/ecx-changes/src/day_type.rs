//! `DayType` — the categories a special day can belong to.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use ecx_core::errors::{Error, Result};

/// Category of a special day.
///
/// In a normalized calendar every date carries at most one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Exchange closed.
    Holiday,
    /// Session opens at a non-standard time.
    SpecialOpen,
    /// Session closes at a non-standard time.
    SpecialClose,
    /// Expiry day in a non-quarterly month.
    MonthlyExpiry,
    /// Expiry day in a quarterly month.
    QuarterlyExpiry,
}

impl DayType {
    /// Every day type, in wire order.
    pub const ALL: [DayType; 5] = [
        DayType::Holiday,
        DayType::SpecialOpen,
        DayType::SpecialClose,
        DayType::MonthlyExpiry,
        DayType::QuarterlyExpiry,
    ];

    /// Position in [`DayType::ALL`].
    pub fn index(self) -> usize {
        match self {
            DayType::Holiday => 0,
            DayType::SpecialOpen => 1,
            DayType::SpecialClose => 2,
            DayType::MonthlyExpiry => 3,
            DayType::QuarterlyExpiry => 4,
        }
    }

    /// Wire name, e.g. `"special_open"`.
    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Holiday => "holiday",
            DayType::SpecialOpen => "special_open",
            DayType::SpecialClose => "special_close",
            DayType::MonthlyExpiry => "monthly_expiry",
            DayType::QuarterlyExpiry => "quarterly_expiry",
        }
    }

    /// Whether a day of this type carries a session time.
    pub fn requires_time(self) -> bool {
        matches!(self, DayType::SpecialOpen | DayType::SpecialClose)
    }

    /// Whether this is one of the expiry types.
    pub fn is_expiry(self) -> bool {
        matches!(self, DayType::MonthlyExpiry | DayType::QuarterlyExpiry)
    }
}

impl FromStr for DayType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DayType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidArgument(format!("unknown day type {s:?}")))
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for t in DayType::ALL {
            assert_eq!(t.as_str().parse::<DayType>().unwrap(), t);
            assert_eq!(DayType::ALL[t.index()], t);
        }
        assert!("weekend".parse::<DayType>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&DayType::QuarterlyExpiry).unwrap();
        assert_eq!(json, "\"quarterly_expiry\"");
        let t: DayType = serde_json::from_str("\"special_close\"").unwrap();
        assert_eq!(t, DayType::SpecialClose);
    }

    #[test]
    fn time_requirement() {
        assert!(DayType::SpecialOpen.requires_time());
        assert!(DayType::SpecialClose.requires_time());
        assert!(!DayType::Holiday.requires_time());
        assert!(!DayType::MonthlyExpiry.requires_time());
    }
}
