//! CLI commands

mod common;
mod identify;
mod main;
mod watch;

pub use common::Command;
pub use identify::identify;
pub use main::main;
pub use watch::watch;
