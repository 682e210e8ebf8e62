//! The coordination service trait

use crate::error::Result;
use crate::protocol::Message;
use crate::session::{ClientSettings, SessionState};

/// Anything that relays between this client and the coordination service.
pub trait Coordinator {
    /// Pick up whatever the service told us since the last cycle.
    fn refresh(&mut self) -> Result<()>;

    /// The session as of the last refresh.
    fn state(&self) -> &SessionState;

    /// Announce how the service should treat this client.
    fn configure(&mut self, settings: &ClientSettings) -> Result<()>;

    /// Provide the token this client authenticates its slot with.
    fn set_auth(&mut self, token: &str) -> Result<()>;

    /// Send messages to the service.
    ///
    /// Failures are reported as `Error::ProtocolSendFailure`.
    fn send(&mut self, messages: &[Message]) -> Result<()>;
}
