//! Snapshots of the observed program's progress, and the deltas between the
//! snapshots we accept.

use crate::snapshot::{FlagBitfield, OrderedFlags};
use std::collections::BTreeSet;

/// Everything needed to turn save flags into a snapshot.
#[derive(Clone, Debug)]
pub struct Rules {
    base_offset: i64,
    goal_flag: u32,
    events: OrderedFlags,
    keys: OrderedFlags,
}

impl Rules {
    pub fn new(base_offset: i64, goal_flag: u32, events: OrderedFlags, keys: OrderedFlags) -> Self {
        Rules {
            base_offset,
            goal_flag,
            events,
            keys,
        }
    }

    pub fn goal_flag(&self) -> u32 {
        self.goal_flag
    }

    pub fn set_goal_flag(&mut self, flag: u32) {
        self.goal_flag = flag;
    }
}

/// The logical state of the observed program for one cycle.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Snapshot {
    checked: BTreeSet<i64>,
    goal_reached: bool,
    events: u64,
    keys: u64,
}

impl Snapshot {
    /// Derive a snapshot from the save flags.
    ///
    /// Only locations the coordination service is tracking for this session
    /// count as checked.
    pub fn capture(bits: &FlagBitfield, rules: &Rules, tracked: &BTreeSet<i64>) -> Self {
        let checked = bits
            .iter_set()
            .map(|flag| flag as i64 + rules.base_offset)
            .filter(|location| tracked.contains(location))
            .collect();

        Snapshot {
            checked,
            goal_reached: bits.is_set(rules.goal_flag),
            events: rules.events.encode(bits),
            keys: rules.keys.encode(bits),
        }
    }

    pub fn checked(&self) -> &BTreeSet<i64> {
        &self.checked
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn keys(&self) -> u64 {
        self.keys
    }
}

/// What changed between the accepted snapshot and a new one.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Delta {
    /// The full checked location set, if it differs from the accepted one.
    pub checked: Option<BTreeSet<i64>>,

    /// Whether the goal was reached just now.
    pub goal_reached: bool,

    /// The tracked event bitfield, if it changed.
    pub events: Option<u64>,

    /// The key location bitfield, if it changed.
    pub keys: Option<u64>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.checked.is_none() && !self.goal_reached && self.events.is_none() && self.keys.is_none()
    }
}

/// Holds the last accepted snapshot and diffs new ones against it.
///
/// A tracker without an accepted snapshot is unsynced. Its first observation
/// is compared against an empty snapshot, and always reports both
/// bitfields so the remote side starts from a known baseline.
#[derive(Clone, Debug, Default)]
pub struct Tracker {
    accepted: Option<Snapshot>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_synced(&self) -> bool {
        self.accepted.is_some()
    }

    pub fn accepted(&self) -> Option<&Snapshot> {
        self.accepted.as_ref()
    }

    /// Compare a new snapshot against the accepted one, then accept it.
    ///
    /// The accepted snapshot is only replaced once every comparison is done.
    pub fn observe(&mut self, snapshot: Snapshot) -> Delta {
        let empty = Snapshot::default();
        let first = self.accepted.is_none();
        let previous = self.accepted.as_ref().unwrap_or(&empty);

        let delta = Delta {
            checked: if snapshot.checked != previous.checked {
                Some(snapshot.checked.clone())
            } else {
                None
            },
            goal_reached: snapshot.goal_reached && !previous.goal_reached,
            events: if first || snapshot.events != previous.events {
                Some(snapshot.events)
            } else {
                None
            },
            keys: if first || snapshot.keys != previous.keys {
                Some(snapshot.keys)
            } else {
                None
            },
        };

        self.accepted = Some(snapshot);

        delta
    }

    /// Forget the accepted snapshot, e.g. after losing the connection.
    pub fn reset(&mut self) {
        self.accepted = None;
    }
}
