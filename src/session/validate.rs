//! Checking that the emulator runs the game build we expect.

use crate::error::{Error, Result, VersionProblem};
use crate::memory::Port;
use crate::platform::platinum::{
    Layout, EXPECTED_ROM_NAME, FAMILY_PREFIX, SYSTEM, UNPATCHED_SIGNATURE,
};
use crate::session::ClientSettings;
use log::{error, info};

/// Classify a raw identity string read from the ROM header.
///
/// Zero bytes are dropped before decoding.
pub fn identify(raw: &[u8]) -> Result<()> {
    let bytes: Vec<u8> = raw.iter().copied().filter(|b| *b != 0).collect();
    let name = String::from_utf8_lossy(&bytes).into_owned();

    if !bytes.is_ascii() || !name.starts_with(FAMILY_PREFIX) {
        return Err(Error::IdentityMismatch(name));
    }

    if name == UNPATCHED_SIGNATURE {
        return Err(Error::VersionMismatch(VersionProblem::Unpatched));
    }

    if !name.starts_with(EXPECTED_ROM_NAME) {
        return Err(Error::VersionMismatch(VersionProblem::WrongBuild(name)));
    }

    Ok(())
}

/// Ensure the emulator is running the system our game was made for.
///
/// Ports that cannot tell pass unconditionally.
pub fn check_system<P>(port: &mut P) -> Result<()>
where
    P: Port + ?Sized,
{
    match port.system()? {
        Some(ref system) if system != SYSTEM => Err(Error::IdentityMismatch(format!(
            "a program for {} instead of {}",
            system, SYSTEM
        ))),
        _ => Ok(()),
    }
}

/// Validate the running game image, yielding the settings to announce to the
/// coordination service.
pub fn validate<P>(port: &mut P, layout: &Layout) -> Result<ClientSettings>
where
    P: Port + ?Sized,
{
    let raw = port.read(&[layout.identity().clone()])?;

    match identify(raw.first().map(|r| r.as_slice()).unwrap_or(&[])) {
        Ok(()) => {
            info!("Game image identified as {}", EXPECTED_ROM_NAME);
            Ok(ClientSettings::for_game())
        }
        Err(e) => {
            error!("{}", e);
            Err(e)
        }
    }
}

/// Read the token this slot authenticates with from the game image.
pub fn establish_auth<P>(port: &mut P, layout: &Layout) -> Result<String>
where
    P: Port + ?Sized,
{
    let mut raw = port
        .read(&[layout.auth().clone()])?
        .pop()
        .unwrap_or_default();

    while raw.last() == Some(&0) {
        raw.pop();
    }

    String::from_utf8(raw)
        .map_err(|e| Error::MissingData(format!("a readable auth token ({})", e)))
}
