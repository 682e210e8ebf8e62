//! A coordinator that leaves the network connection to another process.
//!
//! The other process keeps the session state in a JSON file, which we read
//! every cycle, and consumes our output line by line. A line holding a JSON
//! object describes this client; a line holding a JSON array carries
//! messages for the service.

use crate::error::{Error, Result};
use crate::protocol::{Coordinator, Message};
use crate::session::{ClientSettings, SessionState};
use log::{info, warn};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct Announcement<'a> {
    #[serde(flatten)]
    settings: &'a ClientSettings,
    auth: &'a str,
}

pub struct PipeCoordinator<W> {
    state_path: PathBuf,
    output: W,
    state: SessionState,
    settings: Option<ClientSettings>,
}

impl PipeCoordinator<io::Stdout> {
    pub fn stdout(state_path: &Path) -> Self {
        Self::new(state_path, io::stdout())
    }
}

impl<W> PipeCoordinator<W>
where
    W: io::Write,
{
    pub fn new(state_path: &Path, output: W) -> Self {
        PipeCoordinator {
            state_path: state_path.to_path_buf(),
            output,
            state: SessionState::default(),
            settings: None,
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }

    fn write_line<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let line = serde_json::to_string(value)?;

        (|| -> io::Result<()> {
            writeln!(self.output, "{}", line)?;
            self.output.flush()
        })()
        .map_err(|e| Error::ProtocolSendFailure(e.to_string()))
    }
}

impl<W> Coordinator for PipeCoordinator<W>
where
    W: io::Write,
{
    fn refresh(&mut self) -> Result<()> {
        match SessionState::read(&self.state_path) {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(Error::Io(ref e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn state(&self) -> &SessionState {
        &self.state
    }

    fn configure(&mut self, settings: &ClientSettings) -> Result<()> {
        info!(
            "Playing {} (items handling {:#05b})",
            settings.game, settings.items_handling
        );
        self.settings = Some(settings.clone());

        Ok(())
    }

    fn set_auth(&mut self, token: &str) -> Result<()> {
        match self.settings.take() {
            Some(settings) => {
                let result = self.write_line(&Announcement {
                    settings: &settings,
                    auth: token,
                });
                self.settings = Some(settings);

                result
            }
            None => {
                warn!("Auth token established before the client was configured");
                Ok(())
            }
        }
    }

    fn send(&mut self, messages: &[Message]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        self.write_line(messages)
    }
}
