//! Built-in expiry configuration per exchange.

use std::collections::BTreeMap;

use crate::config::ExtensionSpec;

/// Exchanges whose derivatives expire on the third Friday.
const FRIDAY_EXPIRY: &[&str] = &[
    "ASEX", "XAMS", "XBRU", "XBUD", "XCSE", "XDUB", "XETR", "XHEL", "XIST", "XLIS", "XLON",
    "XMAD", "XMIL", "XNYS", "XOSL", "XPAR", "XPRA", "XSTO", "XSWX", "XTAE", "XTSE", "XWAR",
    "XWBO",
];

/// Exchanges whose derivatives expire on the third Thursday.
const THURSDAY_EXPIRY: &[&str] = &["XJSE"];

/// Default extension specs keyed by exchange.
///
/// Exchanges not listed here get [`ExtensionSpec::default`], which has no
/// expiry weekday.
pub fn default_extensions() -> BTreeMap<String, ExtensionSpec> {
    let friday = FRIDAY_EXPIRY
        .iter()
        .map(|k| (k.to_string(), ExtensionSpec::with_expiry(4)));
    let thursday = THURSDAY_EXPIRY
        .iter()
        .map(|k| (k.to_string(), ExtensionSpec::with_expiry(3)));
    friday.chain(thursday).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn table_contents() {
        let table = default_extensions();
        assert_eq!(table.len(), 24);
        assert_eq!(table["XJSE"].expiry_weekday(), Some(Weekday::Thu));
        assert_eq!(table["XETR"].expiry_weekday(), Some(Weekday::Fri));
        assert!(!table.contains_key("XNAS"));
        assert!(table.values().all(|s| s.validate().is_ok()));
    }
}
