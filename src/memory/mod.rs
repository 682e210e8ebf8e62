//! A set of types which model the memory of the observed program and the
//! ports we reach it through.

mod address;
pub mod bridge;
mod endianness;
mod guard;
mod image;
mod region;
mod traits;

pub use address::{AddressRef, IndirectRef, Write};
pub use bridge::BridgeConnector;
pub use endianness::Endianness;
pub use guard::{guarded_read, Guard};
pub use image::MemoryImage;
pub use region::Domain;
pub use traits::Port;
