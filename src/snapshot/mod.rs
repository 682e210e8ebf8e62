//! Turning raw save flags into logical snapshots, and snapshots into deltas.

mod bitfield;
mod tracker;

pub use bitfield::{FlagBitfield, OrderedFlags};
pub use tracker::{Delta, Rules, Snapshot, Tracker};

#[cfg(test)]
mod tests;
