//! Error type for the synchronization client

use std::{io, result};
use thiserror::Error;

/// Why a program image was identified as the right game but the wrong build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionProblem {
    /// The image is the stock game with no patch applied.
    Unpatched,

    /// The image was patched by a generator this client does not match.
    WrongBuild(String),
}

/// Every way a cycle or a session can go wrong.
///
/// Only `IdentityMismatch` and `VersionMismatch` are fatal. Everything else
/// degrades to "try again next cycle".
#[derive(Debug, Error)]
pub enum Error {
    /// The observed program is not this game at all.
    #[error("the running program is not a supported game image (found {0:?})")]
    IdentityMismatch(String),

    /// The observed program is this game, but not the expected build.
    #[error("{}", version_guidance(.0))]
    VersionMismatch(VersionProblem),

    /// The emulator bridge is unreachable or rejected a request.
    #[error("lost connection to the emulator: {0}")]
    ConnectionLost(String),

    /// The coordination service transport refused an outbound message.
    #[error("could not send to the coordination service: {0}")]
    ProtocolSendFailure(String),

    /// An inbound item cannot be expressed in the game's item numbering.
    #[error("item {0} is outside of the game's local item numbering")]
    InvalidItem(i64),

    /// The game data tables are missing a required entry.
    #[error("game data is missing {0}")]
    MissingData(String),

    /// Underlying cause of error is I/O related
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Underlying cause of error is JSON related
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn version_guidance(problem: &VersionProblem) -> String {
    match problem {
        VersionProblem::Unpatched => "You appear to be running an unpatched copy of the game. \
            Generate a patch file and use it to create a patched ROM first."
            .to_string(),
        VersionProblem::WrongBuild(found) => format!(
            "The patch used to create this ROM ({}) is not compatible with this client. \
            Double check your client version against the version used by the generator.",
            found
        ),
    }
}

impl Error {
    /// Whether the error should end the session instead of a single cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::IdentityMismatch(_) | Error::VersionMismatch(_))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(e) => e,
            _ => io::Error::new(io::ErrorKind::Other, format!("{}", err)),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
