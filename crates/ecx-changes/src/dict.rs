//! Dictionary wire format for changesets.
//!
//! ```json
//! {
//!   "holiday":      {"add": [{"date": "2023-01-02", "value": {"name": "Holiday"}}],
//!                    "remove": ["2023-01-03"]},
//!   "special_open": {"add": [{"date": "2023-01-04",
//!                             "value": {"name": "Special Open", "time": "10:00"}}]}
//! }
//! ```
//!
//! Dates accept every form the parsing boundary accepts and are written as
//! `YYYY-MM-DD`; times accept `HH:MM` or `HH:MM:SS` and are written as
//! `HH:MM:SS`. Unknown keys and unknown day types are rejected.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use ecx_core::errors::{Error, Result};

use crate::day_spec::DaySpec;
use crate::day_type::DayType;

/// One added day on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayEntry {
    /// The date.
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    /// Name and optional time.
    pub value: DayValue,
}

/// Payload of a [`DayEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayValue {
    /// Display name.
    pub name: String,
    /// Session time for special opens and closes.
    #[serde(default, with = "wire_time", skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
}

/// Additions and removals of one day type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeChangesDict {
    /// Days to add.
    #[serde(default)]
    pub add: Vec<DayEntry>,
    /// Dates to remove.
    #[serde(default, with = "wire_dates")]
    pub remove: Vec<NaiveDate>,
}

/// A full changeset on the wire, keyed by day type.
pub type ChangeSetDict = BTreeMap<DayType, TypeChangesDict>;

impl From<&DaySpec> for DayEntry {
    fn from(spec: &DaySpec) -> Self {
        DayEntry {
            date: spec.date,
            value: DayValue {
                name: spec.name.clone(),
                time: spec.time,
            },
        }
    }
}

impl From<DayEntry> for DaySpec {
    fn from(entry: DayEntry) -> Self {
        DaySpec {
            date: entry.date,
            name: entry.value.name,
            time: entry.value.time,
        }
    }
}

/// Parse a dictionary from JSON.
pub fn dict_from_json_str(s: &str) -> Result<ChangeSetDict> {
    serde_json::from_str(s)
        .map_err(|e| Error::InvalidArgument(format!("malformed changeset dictionary: {e}")))
}

/// Render a dictionary as JSON.
pub fn dict_to_json_string(dict: &ChangeSetDict) -> Result<String> {
    serde_json::to_string(dict)
        .map_err(|e| Error::InvalidArgument(format!("cannot serialize changeset: {e}")))
}

// ── serde helpers ────────────────────────────────────────────────────────────

mod wire_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        ecx_core::parsers::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

mod wire_dates {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dates: &[NaiveDate], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(dates.iter().map(|d| d.format("%Y-%m-%d").to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<NaiveDate>, D::Error> {
        Vec::<String>::deserialize(d)?
            .iter()
            .map(|raw| ecx_core::parsers::parse_date(raw).map_err(serde::de::Error::custom))
            .collect()
    }
}

mod wire_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.collect_str(&t.format("%H:%M:%S")),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| ecx_core::parsers::parse_time(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
