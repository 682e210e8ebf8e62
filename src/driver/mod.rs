//! The polling loop that keeps the coordination service in sync with the
//! running game.

mod link;

pub use link::{Driver, LinkState};

#[cfg(test)]
mod tests;
