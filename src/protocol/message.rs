//! The messages this client sends to the coordination service.

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Progress of a slot, as the coordination service numbers it.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(into = "u8", try_from = "u8")]
pub enum ClientStatus {
    Unknown,
    Connected,
    Ready,
    Playing,
    Goal,
}

impl From<ClientStatus> for u8 {
    fn from(status: ClientStatus) -> u8 {
        match status {
            ClientStatus::Unknown => 0,
            ClientStatus::Connected => 5,
            ClientStatus::Ready => 10,
            ClientStatus::Playing => 20,
            ClientStatus::Goal => 30,
        }
    }
}

impl TryFrom<u8> for ClientStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ClientStatus::Unknown),
            5 => Ok(ClientStatus::Connected),
            10 => Ok(ClientStatus::Ready),
            20 => Ok(ClientStatus::Playing),
            30 => Ok(ClientStatus::Goal),
            _ => Err(format!("unknown client status {}", value)),
        }
    }
}

/// One step of a `Set` message, applied to the stored value.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "operation", content = "value", rename_all = "lowercase")]
pub enum Operation {
    Or(u64),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "cmd")]
pub enum Message {
    /// Every location this slot has checked so far.
    LocationChecks { locations: Vec<i64> },

    StatusUpdate { status: ClientStatus },

    /// Update a value in the service's data storage.
    Set {
        key: String,
        default: u64,
        want_reply: bool,
        operations: Vec<Operation>,
    },
}

impl Message {
    /// A `Set` that ORs a bitfield into the value stored under `key`.
    pub fn set_bits(key: String, bits: u64) -> Self {
        Message::Set {
            key,
            default: 0,
            want_reply: false,
            operations: vec![Operation::Or(bits)],
        }
    }
}
