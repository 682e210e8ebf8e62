//! Layouts and data tables of the games this client can synchronize.
//!
//! Everything the client knows about where a game keeps its state lives
//! here; the rest of the client only deals in address references.

pub mod catalog;
mod data;
pub mod platinum;

pub use data::{GameData, LocationData};
