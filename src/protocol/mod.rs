//! Talking to the coordination service.
//!
//! Only the handful of message shapes this client emits are modelled here.
//! The connection itself is someone else's business, reached through the
//! `Coordinator` trait.

mod adapter;
mod message;
mod pipe;
mod traits;

pub use adapter::translate;
pub use message::{ClientStatus, Message, Operation};
pub use pipe::PipeCoordinator;
pub use traits::Coordinator;
