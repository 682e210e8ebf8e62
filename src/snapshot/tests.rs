use crate::snapshot::{Delta, FlagBitfield, OrderedFlags, Rules, Snapshot, Tracker};
use std::collections::BTreeSet;

const BASE_OFFSET: i64 = 1000;
const GOAL_FLAG: u32 = 70;

fn bits_with(flags: &[u32]) -> FlagBitfield {
    let mut bytes = vec![0u8; 16];
    for flag in flags {
        bytes[(flag / 8) as usize] |= 1 << (flag % 8);
    }

    FlagBitfield::from_chunks(vec![&bytes[..8], &bytes[8..]])
}

fn rules() -> Rules {
    Rules::new(
        BASE_OFFSET,
        GOAL_FLAG,
        OrderedFlags::new(vec![Some(40), Some(41), Some(42), None]),
        OrderedFlags::new(vec![Some(3), Some(5)]),
    )
}

fn tracked(ids: &[i64]) -> BTreeSet<i64> {
    ids.iter().copied().collect()
}

#[test]
fn bitfield_concatenates_chunks() {
    let bits = bits_with(&[0, 9, 64, 127]);

    assert_eq!(bits.bit_count(), 128);
    assert!(bits.is_set(64));
    assert!(!bits.is_set(65));
    assert!(!bits.is_set(4000));
    assert_eq!(bits.iter_set().collect::<Vec<_>>(), vec![0, 9, 64, 127]);
}

#[test]
fn ordered_flags_sum_set_positions() {
    let flags = OrderedFlags::new(vec![Some(10), Some(11), Some(12), Some(13)]);
    let bits = bits_with(&[10, 12, 13]);
    let value = flags.encode(&bits);

    assert_eq!(value, 1 + 4 + 8);
    assert_eq!(flags.decode(value), vec![0, 2, 3]);
}

#[test]
fn bit_42_of_a_wide_catalog() {
    let mut entries = vec![None; 50];
    entries[42] = Some(100);
    let flags = OrderedFlags::new(entries);

    assert_eq!(flags.encode(&bits_with(&[100])), 1u64 << 42);
    assert_eq!(flags.decode(1u64 << 42), vec![42]);
}

#[test]
fn catalog_bits_follow_declared_positions() {
    let flags = OrderedFlags::at_positions(vec![(2, Some(10)), (0, Some(11)), (5, None)]);

    assert_eq!(flags.len(), 6);
    assert_eq!(flags.encode(&bits_with(&[10])), 1 << 2);
    assert_eq!(flags.encode(&bits_with(&[11])), 1);
    assert_eq!(flags.decode(flags.encode(&bits_with(&[10, 11]))), vec![0, 2]);
}

#[test]
fn capture_only_counts_tracked_locations() {
    let bits = bits_with(&[1, 2, 3, GOAL_FLAG]);
    let snapshot = Snapshot::capture(&bits, &rules(), &tracked(&[1001, 1003, 1050]));

    assert_eq!(snapshot.checked(), &tracked(&[1001, 1003]));
    assert!(snapshot.goal_reached());
    assert_eq!(snapshot.events(), 0);
    assert_eq!(snapshot.keys(), 1);
}

#[test]
fn first_observation_reports_everything() {
    let mut tracker = Tracker::new();
    assert!(!tracker.is_synced());

    let snapshot = Snapshot::capture(&bits_with(&[]), &rules(), &tracked(&[1001]));
    let delta = tracker.observe(snapshot);

    assert!(tracker.is_synced());
    assert_eq!(delta.checked, None);
    assert!(!delta.goal_reached);
    assert_eq!(delta.events, Some(0));
    assert_eq!(delta.keys, Some(0));
    assert!(!delta.is_empty());
}

#[test]
fn unchanged_snapshots_are_idempotent() {
    let mut tracker = Tracker::new();
    let bits = bits_with(&[1, 41, 5]);
    let tracked = tracked(&[1001]);

    let first = tracker.observe(Snapshot::capture(&bits, &rules(), &tracked));
    assert_eq!(first.checked, Some(tracked.clone()));
    assert_eq!(first.events, Some(2));
    assert_eq!(first.keys, Some(2));

    for _ in 0..5 {
        let delta = tracker.observe(Snapshot::capture(&bits, &rules(), &tracked));
        assert_eq!(delta, Delta::default());
        assert!(delta.is_empty());
    }
}

#[test]
fn checked_set_is_reported_in_full() {
    let mut tracker = Tracker::new();
    let tracked = tracked(&[1001, 1002, 1003]);

    tracker.observe(Snapshot::capture(&bits_with(&[1]), &rules(), &tracked));
    let delta = tracker.observe(Snapshot::capture(&bits_with(&[1, 3]), &rules(), &tracked));

    assert_eq!(delta.checked, Some(tracked.iter().copied().filter(|id| *id != 1002).collect()));
    assert_eq!(delta.events, None);
    assert_eq!(delta.keys, Some(1));
}

#[test]
fn goal_fires_once() {
    let mut tracker = Tracker::new();
    let tracked = tracked(&[]);
    let mut fired = 0;

    tracker.observe(Snapshot::capture(&bits_with(&[]), &rules(), &tracked));
    for _ in 0..10 {
        let delta = tracker.observe(Snapshot::capture(&bits_with(&[GOAL_FLAG]), &rules(), &tracked));
        if delta.goal_reached {
            fired += 1;
        }
    }

    assert_eq!(fired, 1);
}

#[test]
fn goal_flag_can_change() {
    let mut rules = rules();
    rules.set_goal_flag(3);

    assert_eq!(rules.goal_flag(), 3);
    assert!(Snapshot::capture(&bits_with(&[3]), &rules, &tracked(&[])).goal_reached());
}

#[test]
fn reset_tracker_reports_everything_again() {
    let mut tracker = Tracker::new();
    let bits = bits_with(&[40, GOAL_FLAG]);
    let tracked = tracked(&[]);

    tracker.observe(Snapshot::capture(&bits, &rules(), &tracked));
    tracker.reset();
    assert!(!tracker.is_synced());
    assert!(tracker.accepted().is_none());

    let delta = tracker.observe(Snapshot::capture(&bits, &rules(), &tracked));
    assert!(delta.goal_reached);
    assert_eq!(delta.events, Some(1));
    assert_eq!(delta.keys, Some(0));
}
