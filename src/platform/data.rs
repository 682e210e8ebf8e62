//! Game data tables supplied by the host.
//!
//! Addresses, flag constants and the location table are extracted from the
//! game's build and shipped as JSON. We only ever read them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

/// One entry of the location table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LocationData {
    pub label: String,

    /// The save flag that is set once this location has been checked.
    pub flag: Option<u32>,

    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// In-memory representation of the host's game data file.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GameData {
    /// Offset between save flag numbers and location ids, and between the
    /// game's own item numbers and item ids.
    base_offset: i64,

    #[serde(default)]
    rom_addresses: HashMap<String, u32>,

    #[serde(default)]
    ram_addresses: HashMap<String, u32>,

    #[serde(default)]
    constants: HashMap<String, u32>,

    #[serde(default)]
    locations: HashMap<String, LocationData>,
}

impl GameData {
    pub fn new(base_offset: i64) -> Self {
        GameData {
            base_offset,
            ..Default::default()
        }
    }

    pub fn read(filename: &Path) -> Result<Self> {
        let data_file = fs::File::open(filename)?;

        Ok(serde_json::from_reader(data_file)?)
    }

    pub fn base_offset(&self) -> i64 {
        self.base_offset
    }

    pub fn set_rom_address(&mut self, name: &str, address: u32) {
        self.rom_addresses.insert(name.to_string(), address);
    }

    pub fn set_ram_address(&mut self, name: &str, address: u32) {
        self.ram_addresses.insert(name.to_string(), address);
    }

    pub fn set_constant(&mut self, name: &str, value: u32) {
        self.constants.insert(name.to_string(), value);
    }

    pub fn set_location(&mut self, name: &str, location: LocationData) {
        self.locations.insert(name.to_string(), location);
    }

    pub fn rom_address(&self, name: &str) -> Result<u32> {
        self.rom_addresses
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingData(format!("ROM address {}", name)))
    }

    pub fn ram_address(&self, name: &str) -> Result<u32> {
        self.ram_addresses
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingData(format!("RAM address {}", name)))
    }

    pub fn constant(&self, name: &str) -> Result<u32> {
        self.constants
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingData(format!("constant {}", name)))
    }

    pub fn location(&self, name: &str) -> Result<&LocationData> {
        self.locations
            .get(name)
            .ok_or_else(|| Error::MissingData(format!("location {}", name)))
    }

    /// The flag that marks the given location as checked.
    pub fn location_flag(&self, name: &str) -> Result<u32> {
        self.location(name)?
            .flag
            .ok_or_else(|| Error::MissingData(format!("a flag for location {}", name)))
    }

    /// The location id reported for a given save flag.
    pub fn offset_flag(&self, flag: u32) -> i64 {
        flag as i64 + self.base_offset
    }
}
