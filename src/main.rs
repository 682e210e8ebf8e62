#[macro_use]
extern crate clap;

#[macro_use]
extern crate serde_plain;

mod cli;
mod delivery;
mod driver;
mod error;
mod memory;
mod platform;
mod project;
mod protocol;
mod session;
mod snapshot;

use std::io;

fn main() -> io::Result<()> {
    cli::main()
}
