//! Handing items granted by the coordination service to the running game.
//!
//! The game exposes a single slot mailbox. We fill it when it is empty and
//! the game empties it once it has handed the item to the player, so at most
//! one item moves per cycle.

mod mailbox;

pub use mailbox::{deliver_next, Delivery, Mailbox};
