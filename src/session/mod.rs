//! The session this client plays in: what the coordination service tells us
//! about it, and what we tell the service about ourselves.

mod state;
mod validate;

pub use state::{ClientSettings, ItemRecord, SessionState, SlotData};
pub use validate::{check_system, establish_auth, identify, validate};
