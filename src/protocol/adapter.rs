//! Turning snapshot deltas into outbound messages.

use crate::platform::platinum::{events_key, keys_key};
use crate::protocol::{ClientStatus, Message};
use crate::session::SessionState;
use crate::snapshot::Delta;
use log::debug;

/// Express a delta as the messages the coordination service expects.
///
/// An empty delta yields no messages. Bitfields can only be stored once the
/// service has told us our slot; without one they are dropped.
pub fn translate(delta: &Delta, state: &SessionState) -> Vec<Message> {
    let mut messages = Vec::new();

    if let Some(checked) = &delta.checked {
        messages.push(Message::LocationChecks {
            locations: checked.iter().copied().collect(),
        });
    }

    if delta.goal_reached && !state.finished_game {
        messages.push(Message::StatusUpdate {
            status: ClientStatus::Goal,
        });
    }

    let bitfields = [
        (delta.events, events_key as fn(u32, u32) -> String),
        (delta.keys, keys_key),
    ];
    for (bits, key) in bitfields.iter() {
        if let Some(bits) = bits {
            match state.slot {
                Some(slot) => messages.push(Message::set_bits(key(state.team, slot), *bits)),
                None => debug!("Slot unknown, not storing bitfield {:#x}", bits),
            }
        }
    }

    messages
}
