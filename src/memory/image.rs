//! In-memory program images that can stand in for a live emulator.

use crate::error::{Error, Result};
use crate::memory::{AddressRef, Domain, Port, Write};
use std::collections::HashMap;
use std::io;

/// A set of memory domains held entirely in our own memory.
///
/// An image is how we look at a ROM dump without an emulator attached. It
/// also counts round trips and keeps a log of every range it was asked to
/// read, which makes it possible to check how callers use a port.
#[derive(Clone, Debug, Default)]
pub struct MemoryImage {
    domains: HashMap<Domain, Vec<u8>>,
    system: Option<String>,
    round_trips: usize,
    read_log: Vec<AddressRef>,
    write_log: Vec<Write>,
}

impl MemoryImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a ROM dump into the ROM domain of a fresh image.
    pub fn read_rom<F>(file: &mut F) -> io::Result<Self>
    where
        F: io::Read,
    {
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let mut image = Self::new();
        image.install(Domain::Rom, data);

        Ok(image)
    }

    /// Replace the contents of a domain.
    pub fn install(&mut self, domain: Domain, data: Vec<u8>) {
        self.domains.insert(domain, data);
    }

    /// Declare the system this image claims to be running on.
    pub fn set_system(&mut self, system: &str) {
        self.system = Some(system.to_string());
    }

    /// Overwrite part of a domain, growing it if necessary.
    ///
    /// Unlike `Port::write`, this is not logged: it models the program
    /// itself changing its memory.
    pub fn poke(&mut self, domain: Domain, offset: u32, bytes: &[u8]) {
        let data = self.domains.entry(domain).or_insert_with(Vec::new);
        let start = offset as usize;
        let end = start + bytes.len();

        if data.len() < end {
            data.resize(end, 0);
        }

        data[start..end].copy_from_slice(bytes);
    }

    /// Look at part of a domain without going through the port.
    pub fn peek(&self, domain: Domain, offset: u32, length: usize) -> Option<&[u8]> {
        let start = offset as usize;

        self.domains.get(&domain)?.get(start..start + length)
    }

    #[cfg(test)]
    pub fn round_trips(&self) -> usize {
        self.round_trips
    }

    #[cfg(test)]
    pub fn read_log(&self) -> &[AddressRef] {
        &self.read_log
    }

    #[cfg(test)]
    pub fn write_log(&self) -> &[Write] {
        &self.write_log
    }
}

impl Port for MemoryImage {
    fn system(&mut self) -> Result<Option<String>> {
        Ok(self.system.clone())
    }

    fn read(&mut self, reads: &[AddressRef]) -> Result<Vec<Vec<u8>>> {
        self.round_trips += 1;

        let mut out = Vec::with_capacity(reads.len());
        for range in reads {
            self.read_log.push(range.clone());

            let bytes = self
                .peek(range.domain(), range.offset(), range.length())
                .ok_or_else(|| {
                    Error::ConnectionLost(format!(
                        "read of {} bytes at {:#x} is outside of the {} image",
                        range.length(),
                        range.offset(),
                        range.domain().bridge_name()
                    ))
                })?;

            out.push(bytes.to_vec());
        }

        Ok(out)
    }

    fn write(&mut self, writes: &[Write]) -> Result<()> {
        self.round_trips += 1;

        for write in writes {
            self.poke(write.domain(), write.offset(), write.data());
            self.write_log.push(write.clone());
        }

        Ok(())
    }
}
