//! CLI command: identify

use crate::memory::MemoryImage;
use crate::platform::platinum::Layout;
use crate::platform::GameData;
use crate::project::Project;
use crate::session;
use clap::ArgMatches;
use std::fs;
use std::io;

pub fn identify(project: &Project, argv: &ArgMatches) -> io::Result<()> {
    let rom_path = argv.value_of("rom").ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Did not specify a ROM file")
    })?;

    let data = GameData::read(&project.data_path())?;
    let layout = Layout::from_data(&data)?;
    let mut image = MemoryImage::read_rom(&mut fs::File::open(rom_path)?)?;

    let settings = session::validate(&mut image, &layout)?;
    let token = session::establish_auth(&mut image, &layout)?;

    println!("{}: {} build, slot {:?}", rom_path, settings.game, token);

    Ok(())
}
