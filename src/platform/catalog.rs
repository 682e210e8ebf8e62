//! Ordered catalogs of flags that are reported to the tracker as bitfields.
//!
//! A flag's position in its catalog is its bit number in the reported
//! bitfield. Positions are published: once a catalog version ships, entries
//! may be appended but never reordered or removed, or every tracker reading
//! older bitfields silently misreports.

/// The version of the catalog tables below.
pub const CATALOG_VERSION: u32 = 1;

macro_rules! frozen_catalog {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $pos:expr => $key:expr),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $pos),*
        }

        impl $name {
            /// Every entry, in bit order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// The bit this entry occupies in the reported bitfield.
            pub fn position(self) -> u32 {
                self as u32
            }

            /// The name under which the game data knows this entry.
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),*
                }
            }
        }
    };
}

frozen_catalog! {
    /// Story events the tracker follows, keyed by flag constant.
    TrackerEvent {
        DefeatedOreburghGym = 0 => "FLAG_DEFEATED_OREBURGH_GYM",
        DefeatedEternaGym = 1 => "FLAG_DEFEATED_ETERNA_GYM",
        DefeatedVeilstoneGym = 2 => "FLAG_DEFEATED_VEILSTONE_GYM",
        DefeatedPastoriaGym = 3 => "FLAG_DEFEATED_PASTORIA_GYM",
        DefeatedHearthomeGym = 4 => "FLAG_DEFEATED_HEARTHOME_GYM",
        DefeatedCanalaveGym = 5 => "FLAG_DEFEATED_CANALAVE_GYM",
        DefeatedSnowpointGym = 6 => "FLAG_DEFEATED_SNOWPOINT_GYM",
        DefeatedSunyshoreGym = 7 => "FLAG_DEFEATED_SUNYSHORE_GYM",
        IsChampion = 8 => "FLAG_IS_CHAMPION",
    }
}

frozen_catalog! {
    /// Locations holding key items, keyed by location name.
    KeyLocation {
        Hm01 = 0 => "NPC_GIFT_RECEIVED_HM01",
        Hm02 = 1 => "NPC_GIFT_RECEIVED_HM02",
        Hm03 = 2 => "NPC_GIFT_RECEIVED_HM03",
        Hm04 = 3 => "NPC_GIFT_RECEIVED_HM04",
        Hm05 = 4 => "NPC_GIFT_RECEIVED_HM05",
        Hm06 = 5 => "NPC_GIFT_RECEIVED_HM06",
        Hm07 = 6 => "NPC_GIFT_RECEIVED_HM07",
        Hm08 = 7 => "NPC_GIFT_RECEIVED_HM08",
        Bike = 8 => "NPC_GIFT_RECEIVED_BIKE",
        DowsingMachine = 9 => "NPC_GIFT_RECEIVED_DOWSING_MACHINE",
        OldRod = 10 => "NPC_GIFT_RECEIVED_OLD_ROD",
        GoodRod = 11 => "NPC_GIFT_RECEIVED_GOOD_ROD",
        SuperRod = 12 => "NPC_GIFT_RECEIVED_SUPER_ROD",
    }
}
