//! Named address spaces of the observed program.

use serde::Serialize;
use std::str;

/// Enumeration of the memory domains the emulator exposes to us.
///
/// Domains may overlap: the system bus maps both main memory and the ROM
/// image, while the dedicated domains only see their own contents.
#[derive(Copy, Clone, Serialize, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    /// The program image as loaded from the cartridge dump.
    Rom,

    /// Main RAM, addressed from zero.
    MainMemory,

    /// Everything visible to the main CPU, addressed the way the program
    /// addresses it.
    SystemBus,
}

impl Domain {
    /// The name the emulator bridge uses for this domain.
    pub fn bridge_name(self) -> &'static str {
        match self {
            Domain::Rom => "ROM",
            Domain::MainMemory => "Main Memory",
            Domain::SystemBus => "System Bus",
        }
    }
}

impl str::FromStr for Domain {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "rom" => Ok(Domain::Rom),
            "main memory" => Ok(Domain::MainMemory),
            "mainmemory" => Ok(Domain::MainMemory),
            "main_memory" => Ok(Domain::MainMemory),
            "system bus" => Ok(Domain::SystemBus),
            "systembus" => Ok(Domain::SystemBus),
            "system_bus" => Ok(Domain::SystemBus),
            _ => Err(()),
        }
    }
}

derive_deserialize_from_str!(Domain, "valid memory domain name");
