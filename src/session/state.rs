//! Session state shared with the coordination service.

use crate::error::Result;
use crate::platform::platinum::{Goal, GAME_NAME, ITEMS_HANDLING, POLL_FLOOR};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// One item the coordination service granted to this slot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// The item id, in the service's numbering.
    pub item: i64,

    /// The location the item was found at.
    #[serde(default)]
    pub location: i64,

    /// The slot that found the item.
    #[serde(default)]
    pub player: u32,

    #[serde(default)]
    pub flags: u8,
}

/// Generation-time options for this slot, as an opaque JSON object.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SlotData(serde_json::Value);

impl SlotData {
    pub fn new(value: serde_json::Value) -> Self {
        SlotData(value)
    }

    /// The goal the slot was generated with.
    ///
    /// Slot data without a recognizable goal option selects the default goal.
    pub fn goal(&self) -> Goal {
        match self.0.get("goal") {
            None => Goal::default(),
            Some(value) => match value.as_i64().and_then(Goal::from_option) {
                Some(goal) => goal,
                None => {
                    warn!("Unknown goal option {}, assuming the default goal", value);
                    Goal::default()
                }
            },
        }
    }
}

/// Everything the client consumes from the coordination service.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    #[serde(default)]
    pub team: u32,

    /// Our slot number, once the service has told us.
    #[serde(default)]
    pub slot: Option<u32>,

    #[serde(default)]
    pub slot_data: SlotData,

    /// Every location the service is tracking for this slot.
    #[serde(default)]
    pub server_locations: BTreeSet<i64>,

    /// Every item granted to this slot so far, in order.
    #[serde(default)]
    pub items_received: Vec<ItemRecord>,

    /// Whether the service already recorded this slot as finished.
    #[serde(default)]
    pub finished_game: bool,
}

impl SessionState {
    pub fn read(filename: &Path) -> Result<Self> {
        let state_file = fs::File::open(filename)?;

        Ok(serde_json::from_reader(state_file)?)
    }
}

/// How the client wants the coordination service to treat it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub game: String,
    pub items_handling: u8,
    pub want_slot_data: bool,

    /// The game may not be polled faster than this.
    #[serde(skip)]
    pub watcher_timeout: Duration,
}

impl ClientSettings {
    /// Settings for a validated game image.
    pub fn for_game() -> Self {
        ClientSettings {
            game: GAME_NAME.to_string(),
            items_handling: ITEMS_HANDLING,
            want_slot_data: true,
            watcher_timeout: POLL_FLOOR,
        }
    }
}
