//! Memory layout and identity of the patched Pokemon Platinum image.

use crate::error::Result;
use crate::memory::{AddressRef, Domain, Endianness, Guard, IndirectRef};
use crate::platform::catalog::{KeyLocation, TrackerEvent};
use crate::platform::GameData;
use crate::snapshot::OrderedFlags;
use log::warn;
use std::time::Duration;

/// The name the coordination service knows this game by.
pub const GAME_NAME: &str = "Pokemon Platinum";

/// The system the emulator must be running.
pub const SYSTEM: &str = "NDS";

/// Every image of this game has an identity starting with this.
pub const FAMILY_PREFIX: &str = "POKEMON PL";

/// The identity of the stock, unpatched game.
pub const UNPATCHED_SIGNATURE: &str = "POKEMON PLCPUE01";

/// The identity of an image patched for this client version.
pub const EXPECTED_ROM_NAME: &str = "POKEMON PLAPCPUE01";

/// Where the identity string lives in the ROM header.
pub const IDENTITY_OFFSET: u32 = 0x0;
pub const IDENTITY_LENGTH: usize = 0x12;

/// Length of the slot info block holding the auth token.
pub const AUTH_LENGTH: usize = 64;

/// Offset of the received item counter within the save block.
pub const RECEIVED_COUNT_OFFSET: u32 = 0x700;

/// The two save flag chunks, as (save block offset, length).
pub const FLAG_CHUNKS: [(u32, usize); 2] = [(0x1450, 0x96), (0x14E6, 0x96)];

/// Total number of save flags.
pub const FLAG_COUNT: usize = (FLAG_CHUNKS[0].1 + FLAG_CHUNKS[1].1) * 8;

/// Remote items only; our own items are given by the game itself.
pub const ITEMS_HANDLING: u8 = 0b001;

/// We are not allowed to poll the emulator faster than this.
pub const POLL_FLOOR: Duration = Duration::from_millis(125);

/// Where to find things in the observed program's memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    identity: AddressRef,
    auth: AddressRef,
    overworld: Guard,
    save_block: IndirectRef,
    mailbox: AddressRef,
}

impl Layout {
    /// Resolve the layout's addresses from the game data.
    pub fn from_data(data: &GameData) -> Result<Self> {
        let main_callback = data.ram_address("gMain")? + 4;
        let overworld_callback = data.ram_address("CB2_Overworld")? + 1;

        Ok(Layout {
            identity: AddressRef::new(Domain::Rom, IDENTITY_OFFSET, IDENTITY_LENGTH),
            auth: AddressRef::new(Domain::Rom, data.rom_address("gArchipelagoInfo")?, AUTH_LENGTH),
            overworld: Guard::new(
                AddressRef::new(Domain::SystemBus, main_callback, 4),
                Endianness::LittleEndian.encode(overworld_callback as u64, 4),
            ),
            save_block: IndirectRef::new(
                AddressRef::new(Domain::SystemBus, data.ram_address("globalPointer")?, 4),
                Domain::SystemBus,
            ),
            mailbox: AddressRef::new(
                Domain::SystemBus,
                data.ram_address("gArchipelagoReceivedItem")?,
                6,
            ),
        })
    }

    pub fn identity(&self) -> &AddressRef {
        &self.identity
    }

    pub fn auth(&self) -> &AddressRef {
        &self.auth
    }

    /// Holds only while the player is walking around the overworld.
    pub fn overworld_guard(&self) -> &Guard {
        &self.overworld
    }

    /// The pointer to the save block, which moves whenever the game reloads.
    pub fn save_block(&self) -> &IndirectRef {
        &self.save_block
    }

    pub fn mailbox(&self) -> &AddressRef {
        &self.mailbox
    }

    /// The received item counter, given the resolved save block.
    pub fn received_count(&self, save_block: &AddressRef) -> AddressRef {
        save_block.at(RECEIVED_COUNT_OFFSET, 2)
    }

    /// The save flag chunks, given the resolved save block.
    pub fn flag_chunks(&self, save_block: &AddressRef) -> Vec<AddressRef> {
        FLAG_CHUNKS
            .iter()
            .map(|(offset, length)| save_block.at(*offset, *length))
            .collect()
    }
}

/// What the player must achieve for the session to count as won.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Goal {
    /// Become the champion and enter the hall of fame.
    Champion,

    /// Beat the rival at the Survival Area.
    Rival,

    /// Beat the Elite Four a second time.
    Champion2,

    /// Beat Cyrus in Celestic Town.
    Cyrus,

    /// Find all plates and defeat or catch Arceus.
    PlateHunt,
}

impl Goal {
    /// Decode the goal option of the slot data.
    pub fn from_option(value: i64) -> Option<Goal> {
        match value {
            0 => Some(Goal::Champion),
            1 => Some(Goal::Rival),
            2 => Some(Goal::Champion2),
            3 => Some(Goal::Cyrus),
            4 => Some(Goal::PlateHunt),
            _ => None,
        }
    }

    /// The save flag that is set once this goal is reached.
    ///
    /// Goals this client cannot observe, or whose flag the game data does
    /// not define, fall back to the default goal.
    pub fn flag(self, data: &GameData) -> Result<u32> {
        let trainer_flag = |trainer: &str| -> Result<u32> {
            Ok(data.constant("TRAINER_FLAGS_START")? + data.constant(trainer)?)
        };

        let flag = match self {
            Goal::Champion => return data.constant("FLAG_IS_CHAMPION"),
            Goal::Rival => trainer_flag("TRAINER_RIVAL_SURVIVAL_AREA"),
            Goal::Champion2 => data.constant("FLAG_DEFEATED_CHAMPION_REMATCH"),
            Goal::Cyrus => trainer_flag("TRAINER_CYRUS"),
            Goal::PlateHunt => {
                warn!("The plate hunt goal cannot be detected, watching for the champion instead");
                return Goal::Champion.flag(data);
            }
        };

        flag.or_else(|e| {
            warn!(
                "Cannot watch for the {:?} goal ({}), watching for the champion instead",
                self, e
            );
            Goal::Champion.flag(data)
        })
    }
}

impl Default for Goal {
    fn default() -> Self {
        Goal::Champion
    }
}

/// Resolve the tracked event catalog against the game data.
pub fn tracked_events(data: &GameData) -> OrderedFlags {
    OrderedFlags::at_positions(
        TrackerEvent::ALL
            .iter()
            .map(|event| match data.constant(event.key()) {
                Ok(flag) => (event.position(), Some(flag)),
                Err(e) => {
                    warn!("Tracker event {:?} will never be reported: {}", event, e);
                    (event.position(), None)
                }
            }),
    )
}

/// Resolve the key location catalog against the game data.
pub fn key_locations(data: &GameData) -> OrderedFlags {
    OrderedFlags::at_positions(
        KeyLocation::ALL
            .iter()
            .map(|location| match data.location_flag(location.key()) {
                Ok(flag) => (location.position(), Some(flag)),
                Err(e) => {
                    warn!("Key location {:?} will never be reported: {}", location, e);
                    (location.position(), None)
                }
            }),
    )
}

/// The key under which the tracked event bitfield is stored remotely.
pub fn events_key(team: u32, slot: u32) -> String {
    format!("pokemon_platinum_events_{}_{}", team, slot)
}

/// The key under which the key location bitfield is stored remotely.
pub fn keys_key(team: u32, slot: u32) -> String {
    format!("pokemon_platinum_keys_{}_{}", team, slot)
}
