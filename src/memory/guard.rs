//! Guarded reads: batches of reads that are only trusted while a set of side
//! conditions on memory hold.

use crate::error::Result;
use crate::memory::{AddressRef, Port};
use log::debug;

/// A side condition on memory content.
///
/// A guard holds iff the bytes currently at `address` equal `expected`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guard {
    address: AddressRef,
    expected: Vec<u8>,
}

impl Guard {
    /// Construct a guard over the given bytes.
    ///
    /// The guarded range is exactly as long as the expected data.
    pub fn new(address: AddressRef, expected: Vec<u8>) -> Self {
        let address = address.at(0, expected.len());

        Guard { address, expected }
    }

    pub fn address(&self) -> &AddressRef {
        &self.address
    }

    pub fn expected(&self) -> &[u8] {
        &self.expected
    }
}

/// Read memory, but only if every guard holds both before and after the
/// reads were performed.
///
/// Yields `None` if the data is not currently observable: either a guard
/// failed up front, in which case no reads happen at all, or a guard changed
/// while the reads were in flight, in which case the data is discarded.
///
/// Port failures are passed through as errors. They never turn into `None`.
pub fn guarded_read<P>(
    port: &mut P,
    reads: &[AddressRef],
    guards: &[Guard],
) -> Result<Option<Vec<Vec<u8>>>>
where
    P: Port + ?Sized,
{
    if !guards.is_empty() && !port.guard(guards)? {
        return Ok(None);
    }

    let data = port.read(reads)?;

    if !guards.is_empty() && !port.guard(guards)? {
        debug!("Guard changed while reading {} range(s), discarding", reads.len());
        return Ok(None);
    }

    Ok(Some(data))
}
