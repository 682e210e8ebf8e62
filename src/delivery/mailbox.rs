//! Handing received items to the game through its one-slot mailbox.

use crate::error::{Error, Result};
use crate::memory::{AddressRef, Endianness, Port, Write};
use crate::session::ItemRecord;
use log::info;
use std::convert::TryFrom;

/// The received item mailbox in the game's memory.
///
/// Layout: `u16` item id, `u16` new received count, `u8` full flag, `u8`
/// metadata, all little endian.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mailbox {
    address: AddressRef,
}

impl Mailbox {
    pub fn new(address: AddressRef) -> Self {
        Mailbox { address }
    }

    /// The byte the game clears once it took the item out.
    pub fn full_flag(&self) -> AddressRef {
        self.address.at(4, 1)
    }

    /// The writes that fill the mailbox.
    ///
    /// The full flag is written last, so the game never sees a full mailbox
    /// with stale contents.
    pub fn fill(&self, item: u16, count: u16, metadata: u8) -> Vec<Write> {
        vec![
            self.address
                .at(0, 2)
                .write(Endianness::LittleEndian.encode(item as u64, 2)),
            self.address
                .at(2, 2)
                .write(Endianness::LittleEndian.encode(count as u64, 2)),
            self.address.at(5, 1).write(vec![metadata]),
            self.full_flag().write(vec![1]),
        ]
    }
}

/// An item that was put into the mailbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// Position of the item in the session's received item list.
    pub index: usize,

    /// The item, in the game's own numbering.
    pub item: u16,

    /// The received count the game will store once it takes the item.
    pub count: u16,
}

/// Put the next undelivered item into the mailbox, if there is one and the
/// mailbox is empty.
///
/// `received_count` is the number of items the game says it has already
/// taken, and `full` is the current state of the mailbox's full flag.
pub fn deliver_next<P>(
    port: &mut P,
    mailbox: &Mailbox,
    received_count: u16,
    full: bool,
    items: &[ItemRecord],
    base_offset: i64,
) -> Result<Option<Delivery>>
where
    P: Port + ?Sized,
{
    let index = received_count as usize;
    let record = match items.get(index) {
        Some(record) if !full => record,
        _ => return Ok(None),
    };

    let item = record
        .item
        .checked_sub(base_offset)
        .and_then(|local| u16::try_from(local).ok())
        .ok_or(Error::InvalidItem(record.item))?;
    let count = u16::try_from(index + 1).map_err(|_| Error::InvalidItem(record.item))?;

    port.write(&mailbox.fill(item, count, record.flags & 1))?;

    info!("Delivered item {} ({} of {})", record.item, count, items.len());

    Ok(Some(Delivery { index, item, count }))
}
