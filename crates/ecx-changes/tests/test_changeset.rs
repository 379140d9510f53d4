//! Property and scenario tests for `ChangeSet`.

use chrono::{Days, NaiveDate, NaiveTime};
use ecx_changes::{ChangeSet, DaySpec, DayType};
use ecx_core::Error;
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn spec_for(day_type: DayType, d: NaiveDate) -> DaySpec {
    if day_type.requires_time() {
        DaySpec::with_time(d, day_type.as_str(), NaiveTime::from_hms_opt(10, 0, 0).unwrap())
    } else {
        DaySpec::new(d, day_type.as_str())
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add(DayType, u64, bool),
    Remove(Option<DayType>, u64, bool),
    Clear(u64),
}

fn day_type() -> impl Strategy<Value = DayType> {
    (0usize..5).prop_map(|i| DayType::ALL[i])
}

fn op() -> impl Strategy<Value = Op> {
    // A small date pool forces collisions.
    prop_oneof![
        4 => (day_type(), 0u64..6, any::<bool>()).prop_map(|(t, d, s)| Op::Add(t, d, s)),
        3 => (proptest::option::of(day_type()), 0u64..6, any::<bool>())
            .prop_map(|(t, d, s)| Op::Remove(t, d, s)),
        1 => (0u64..6).prop_map(Op::Clear),
    ]
}

fn day(offset: u64) -> NaiveDate {
    date(2023, 1, 2) + Days::new(offset)
}

fn apply(cs: &mut ChangeSet, op: &Op) -> Result<(), Error> {
    match op {
        Op::Add(t, d, strict) => cs.add(*t, spec_for(*t, day(*d)), *strict),
        Op::Remove(t, d, strict) => cs.remove(*t, day(*d), *strict),
        Op::Clear(d) => {
            cs.clear_day(day(*d));
            Ok(())
        }
    }
}

proptest! {
    #[test]
    fn every_sequence_stays_consistent(ops in proptest::collection::vec(op(), 0..40)) {
        let mut cs = ChangeSet::new();
        for op in &ops {
            let before = cs.clone();
            if apply(&mut cs, op).is_err() {
                prop_assert_eq!(&cs, &before);
            }
            prop_assert!(cs.is_consistent());
        }
    }

    #[test]
    fn dictionary_round_trip(ops in proptest::collection::vec(op(), 0..40)) {
        let mut cs = ChangeSet::new();
        for op in &ops {
            let _ = apply(&mut cs, op);
        }
        prop_assert_eq!(ChangeSet::from_dict(&cs.to_dict()).unwrap(), cs.clone());
        let json = cs.to_json_string().unwrap();
        prop_assert_eq!(ChangeSet::from_json_str(&json).unwrap(), cs);
    }

    #[test]
    fn removal_is_idempotent(
        ops in proptest::collection::vec(op(), 0..20),
        t in proptest::option::of(day_type()),
        d in 0u64..6,
    ) {
        let mut cs = ChangeSet::new();
        for op in &ops {
            let _ = apply(&mut cs, op);
        }
        cs.remove(t, day(d), false).unwrap();
        let once = cs.clone();
        cs.remove(t, day(d), false).unwrap();
        prop_assert_eq!(cs, once);
    }

    #[test]
    fn retype_law(t1 in day_type(), t2 in day_type(), d in 0u64..6) {
        prop_assume!(t1 != t2);
        let mut cs = ChangeSet::new();
        cs.add(t1, spec_for(t1, day(d)), false).unwrap();
        cs.add(t2, spec_for(t2, day(d)), false).unwrap();
        prop_assert_eq!(cs.added_type(day(d)), Some(t2));
        prop_assert_eq!(cs.additions().count(), 1);

        let mut strict = ChangeSet::new();
        strict.add(t1, spec_for(t1, day(d)), true).unwrap();
        prop_assert!(matches!(
            strict.add(t2, spec_for(t2, day(d)), true),
            Err(Error::Consistency(_))
        ));
    }
}

#[test]
fn copies_are_independent() {
    let mut owned = ChangeSet::new();
    owned.add(DayType::Holiday, DaySpec::new(date(2023, 1, 2), "Holiday"), false).unwrap();
    let mut copy = owned.clone();
    copy.remove(None, date(2023, 1, 2), false).unwrap();
    assert!(owned.added(DayType::Holiday, date(2023, 1, 2)).is_some());
    assert!(copy.added(DayType::Holiday, date(2023, 1, 2)).is_none());
}

#[test]
fn wire_example_imports() {
    let cs = ChangeSet::from_json_str(
        r#"{
            "holiday": {"add": [{"date": "2020-01-01", "value": {"name": "Holiday"}}],
                        "remove": ["2020-01-02"]},
            "special_open": {"add": [{"date": "2020-02-03",
                                      "value": {"name": "Special Open", "time": "10:00"}}],
                             "remove": ["2020-02-04"]},
            "special_close": {"add": [{"date": "2020-03-03",
                                       "value": {"name": "Special Close", "time": "16:00:00"}}]},
            "monthly_expiry": {"add": [{"date": "2020-04-16", "value": {"name": "Monthly Expiry"}}]},
            "quarterly_expiry": {"remove": ["2020-06-19"]}
        }"#,
    )
    .unwrap();
    assert_eq!(cs.len(), 7);
    assert_eq!(cs.added_type(date(2020, 2, 3)), Some(DayType::SpecialOpen));
    assert_eq!(
        cs.added(DayType::SpecialClose, date(2020, 3, 3)).unwrap().time,
        NaiveTime::from_hms_opt(16, 0, 0)
    );
    assert!(cs.is_removed(DayType::QuarterlyExpiry, date(2020, 6, 19)));
    assert_eq!(cs.removals(DayType::Holiday).collect::<Vec<_>>(), vec![date(2020, 1, 2)]);
}

#[test]
fn malformed_dictionary_is_invalid_argument() {
    assert!(matches!(
        ChangeSet::from_json_str(r#"{"holiday": {"add": [{"date": "not a date", "value": {"name": "x"}}]}}"#),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        ChangeSet::from_json_str(r#"{"holiday": 5}"#),
        Err(Error::InvalidArgument(_))
    ));
}
