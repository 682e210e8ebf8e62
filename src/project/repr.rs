//! Project configuration file representation

use crate::error::Result;
use crate::platform::platinum::POLL_FLOOR;
use clap::{App, Arg, ArgMatches, ArgSettings};
use relative_path::{RelativePath, RelativePathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// In-memory representation of the current project configuration.
///
/// This file is typically read from a file named `retrolink.json`. Every
/// field is optional; missing fields take their defaults, and paths are
/// resolved against the directory holding the project file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    /// Host the emulator connector script listens on.
    bridge: Option<String>,

    /// Port of the connector script; all usual ports are tried if unset.
    bridge_port: Option<u16>,

    /// The game data file of the patched game.
    data: Option<RelativePathBuf>,

    /// The session state file maintained by the coordination service relay.
    session: Option<RelativePathBuf>,

    /// Milliseconds between synchronization cycles.
    interval_ms: Option<u64>,

    /// Cycles between validations of the game image.
    revalidate_every: Option<u32>,

    #[serde(skip)]
    root: Option<PathBuf>,
}

impl Project {
    pub fn read(filename: &Path) -> Result<Self> {
        let project_file = fs::File::open(filename)?;
        let mut project: Self = serde_json::from_reader(project_file)?;

        project.root = filename.parent().map(|p| p.to_path_buf());

        Ok(project)
    }

    pub fn configure_app<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
        app.arg(
            Arg::with_name("bridge")
                .long("bridge")
                .value_name("localhost")
                .help("The host the emulator connector script listens on.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("port")
                .long("port")
                .value_name("43055")
                .help("The port the emulator connector script listens on.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("data")
                .long("data")
                .value_name("data.json")
                .help("The game data file of the patched game, relative to the project file.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("session")
                .long("session")
                .value_name("session.json")
                .help("The session state file to follow, relative to the project file.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("interval")
                .long("interval")
                .value_name("MILLISECONDS")
                .help("How long to wait between synchronization cycles.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("revalidate_every")
                .long("revalidate-every")
                .value_name("CYCLES")
                .help("How many cycles to wait before checking the game image again.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
    }

    /// Construct a Project from clap ArgMatches
    pub fn from_arg_matches(args: &ArgMatches) -> Project {
        Project {
            bridge: args.value_of("bridge").map(|s| s.to_string()),
            bridge_port: args.value_of("port").and_then(|s| s.parse().ok()),
            data: args.value_of("data").map(RelativePathBuf::from),
            session: args.value_of("session").map(RelativePathBuf::from),
            interval_ms: args.value_of("interval").and_then(|s| s.parse().ok()),
            revalidate_every: args
                .value_of("revalidate_every")
                .and_then(|s| s.parse().ok()),
            root: None,
        }
    }

    pub fn bridge_host(&self) -> &str {
        self.bridge.as_deref().unwrap_or("localhost")
    }

    pub fn bridge_port(&self) -> Option<u16> {
        self.bridge_port
    }

    fn resolve(&self, path: Option<&RelativePathBuf>, default: &str) -> PathBuf {
        let path = path.map_or_else(|| RelativePath::new(default), |p| p.as_relative_path());

        path.to_path(self.root.as_deref().unwrap_or_else(|| Path::new(".")))
    }

    pub fn data_path(&self) -> PathBuf {
        self.resolve(self.data.as_ref(), "data.json")
    }

    pub fn session_path(&self) -> PathBuf {
        self.resolve(self.session.as_ref(), "session.json")
    }

    /// Time between cycles; never shorter than the game allows.
    pub fn interval(&self) -> Duration {
        self.interval_ms
            .map_or(POLL_FLOOR, Duration::from_millis)
            .max(POLL_FLOOR)
    }

    pub fn revalidate_every(&self) -> u32 {
        self.revalidate_every.unwrap_or(40)
    }

    /// Layer the values given in `other` over our own.
    pub fn apply_override(&self, other: &Project) -> Project {
        Project {
            bridge: other.bridge.clone().or_else(|| self.bridge.clone()),
            bridge_port: other.bridge_port.or(self.bridge_port),
            data: other.data.clone().or_else(|| self.data.clone()),
            session: other.session.clone().or_else(|| self.session.clone()),
            interval_ms: other.interval_ms.or(self.interval_ms),
            revalidate_every: other.revalidate_every.or(self.revalidate_every),
            root: self.root.clone(),
        }
    }
}
