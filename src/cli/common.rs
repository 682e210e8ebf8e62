//! Common utilities for command implementations

use clap::{App, Arg, SubCommand};
use std::str;
use std::str::FromStr;

/// Enumeration of all CLI commands
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Watch,
    Identify,
}

impl Command {
    /// Enumerate all commands that Retrolink recognizes.
    pub fn enumerate() -> Vec<Self> {
        use Command::*;

        vec![Watch, Identify]
    }

    /// Construct the subcommand object for this particular `Command`.
    pub fn into_clap_subcommand<'a, 'b>(self) -> App<'a, 'b> {
        match self {
            Command::Watch => SubCommand::with_name("watch")
                .about("Keep the coordination service in sync with a running emulator"),
            Command::Identify => SubCommand::with_name("identify")
                .about("Check a ROM dump and print the slot it authenticates as")
                .arg(
                    Arg::with_name("rom")
                        .value_name("game.nds")
                        .index(1)
                        .required(true)
                        .help("The patched ROM file to check"),
                ),
        }
    }
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "watch" => Ok(Command::Watch),
            "identify" => Ok(Command::Identify),
            _ => Err(()),
        }
    }
}
