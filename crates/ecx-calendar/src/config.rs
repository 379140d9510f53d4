//! Extension and registry configuration.
//!
//! [`ExtensionSpec`] says how to derive expiry calendars for one exchange.
//! [`RegistryConfig`] bundles the per-exchange specs with the registry-wide
//! strictness flag and can be loaded from JSON:
//!
//! ```json
//! {
//!   "strict": false,
//!   "extensions": {
//!     "XETR": {"day_of_week_expiry": 4},
//!     "XJSE": {"day_of_week_expiry": 3, "quarterly_months": [3, 6, 9, 12]}
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use ecx_core::ensure;
use ecx_core::errors::{Error, Result};
use ecx_time::expiry::QUARTERLY_MONTHS;
use ecx_time::weekmask::weekday_from_index;

use crate::exchanges::default_extensions;

fn default_nth() -> u32 {
    3
}

fn default_quarterly_months() -> Vec<u32> {
    QUARTERLY_MONTHS.to_vec()
}

/// How to derive expiry calendars for one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionSpec {
    /// Expiry weekday, 0 = Monday … 6 = Sunday. `None` disables expiry and
    /// last-trading-day calendars.
    #[serde(default)]
    pub day_of_week_expiry: Option<u8>,
    /// Which occurrence of the weekday in the month.
    #[serde(default = "default_nth")]
    pub nth: u32,
    /// Months carrying quarterly expiries.
    #[serde(default = "default_quarterly_months")]
    pub quarterly_months: Vec<u32>,
}

impl Default for ExtensionSpec {
    fn default() -> Self {
        Self {
            day_of_week_expiry: None,
            nth: default_nth(),
            quarterly_months: default_quarterly_months(),
        }
    }
}

impl ExtensionSpec {
    /// Third `day_of_week` of each month, standard quarterly months.
    pub fn with_expiry(day_of_week: u8) -> Self {
        Self {
            day_of_week_expiry: Some(day_of_week),
            ..Self::default()
        }
    }

    /// Check ranges of every field.
    pub fn validate(&self) -> Result<()> {
        if let Some(dow) = self.day_of_week_expiry {
            ensure!(dow <= 6, "day_of_week_expiry must be in 0..=6, got {dow}");
        }
        ensure!((1..=5).contains(&self.nth), "nth must be in 1..=5, got {}", self.nth);
        ensure!(
            self.quarterly_months.iter().all(|m| (1..=12).contains(m)),
            "quarterly months must be in 1..=12, got {:?}",
            self.quarterly_months
        );
        Ok(())
    }

    /// The expiry weekday, if expiries are supported.
    pub fn expiry_weekday(&self) -> Option<Weekday> {
        self.day_of_week_expiry.and_then(weekday_from_index)
    }
}

/// Registry-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Reject conflicting changeset operations instead of superseding.
    #[serde(default)]
    pub strict: bool,
    /// Extension specs keyed by exchange.
    #[serde(default = "default_extensions")]
    pub extensions: BTreeMap<String, ExtensionSpec>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict: false,
            extensions: default_extensions(),
        }
    }
}

impl RegistryConfig {
    /// Load from JSON. Missing `extensions` falls back to the built-in table.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| Error::InvalidArgument(format!("malformed registry config: {e}")))?;
        for (key, spec) in &config.extensions {
            spec.validate()
                .map_err(|e| Error::InvalidArgument(format!("extension {key}: {e}")))?;
        }
        Ok(config)
    }
}
