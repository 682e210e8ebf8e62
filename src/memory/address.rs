//! References to byte ranges inside the observed program's memory.

use crate::memory::{Domain, Endianness};
use serde::{Deserialize, Serialize};

/// A byte range inside one memory domain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRef {
    domain: Domain,
    offset: u32,
    length: usize,
}

impl AddressRef {
    pub fn new(domain: Domain, offset: u32, length: usize) -> Self {
        AddressRef {
            domain,
            offset,
            length,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Produce a reference `displacement` bytes past this one's start, in the
    /// same domain.
    pub fn at(&self, displacement: u32, length: usize) -> AddressRef {
        AddressRef {
            domain: self.domain,
            offset: self.offset.wrapping_add(displacement),
            length,
        }
    }

    /// Produce a write of `data` to the start of this reference.
    pub fn write(&self, data: Vec<u8>) -> Write {
        Write::new(self.domain, self.offset, data)
    }
}

/// A pointer stored in the observed program's memory.
///
/// Whatever the pointer points to can move every time the program reloads
/// its state, so the pointer must be read and resolved again each cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndirectRef {
    pointer: AddressRef,
    target: Domain,
}

impl IndirectRef {
    pub fn new(pointer: AddressRef, target: Domain) -> Self {
        IndirectRef { pointer, target }
    }

    /// The location of the pointer value itself.
    pub fn pointer(&self) -> &AddressRef {
        &self.pointer
    }

    /// Resolve the pointer against its freshly read little-endian value.
    ///
    /// The result is a zero-length reference to the pointed-to base, meant to
    /// be extended with `AddressRef::at`.
    pub fn resolve(&self, pointer_value: &[u8]) -> AddressRef {
        let base: u32 = Endianness::LittleEndian.decode(pointer_value);

        AddressRef::new(self.target, base, 0)
    }
}

/// A pending write of bytes into a memory domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Write {
    domain: Domain,
    offset: u32,
    data: Vec<u8>,
}

impl Write {
    pub fn new(domain: Domain, offset: u32, data: Vec<u8>) -> Self {
        Write {
            domain,
            offset,
            data,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
