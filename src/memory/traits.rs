//! The memory access port trait

use crate::error::Result;
use crate::memory::{AddressRef, Guard, Write};

/// Anything that can read and write the memory of the observed program.
///
/// A port owns no knowledge of the program itself. Every call is a single
/// round trip to whatever hosts the program, and every call may fail with
/// `Error::ConnectionLost` if that host went away.
pub trait Port {
    /// Establish the connection to the program host, if not already done.
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    /// Ask the program host which system it is emulating.
    ///
    /// Ports that have no notion of a system yield `None`.
    fn system(&mut self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Read every given range, in order, in one round trip.
    fn read(&mut self, reads: &[AddressRef]) -> Result<Vec<Vec<u8>>>;

    /// Perform every given write, in order, in one round trip.
    fn write(&mut self, writes: &[Write]) -> Result<()>;

    /// Check whether every given guard currently holds.
    ///
    /// The default implementation reads each guarded range and compares it
    /// against the expected bytes. Ports whose host can evaluate guards
    /// natively should override this.
    fn guard(&mut self, guards: &[Guard]) -> Result<bool> {
        let ranges: Vec<AddressRef> = guards.iter().map(|g| g.address().clone()).collect();
        let current = self.read(&ranges)?;

        Ok(guards
            .iter()
            .zip(current.iter())
            .all(|(guard, bytes)| guard.expected() == bytes.as_slice()))
    }
}

impl<P> Port for Box<P>
where
    P: Port + ?Sized,
{
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn system(&mut self) -> Result<Option<String>> {
        (**self).system()
    }

    fn read(&mut self, reads: &[AddressRef]) -> Result<Vec<Vec<u8>>> {
        (**self).read(reads)
    }

    fn write(&mut self, writes: &[Write]) -> Result<()> {
        (**self).write(writes)
    }

    fn guard(&mut self, guards: &[Guard]) -> Result<bool> {
        (**self).guard(guards)
    }
}
