//! CLI support for non-command bits

use crate::cli::common::Command;
use crate::error::Error;
use crate::{cli, project};
use backtrace::Backtrace;
use clap::{AppSettings, Arg, ArgSettings};
use env_logger::Env;
use log::error;
use std::io;
use std::panic::set_hook;
use std::path::Path;
use std::str::FromStr;

pub fn main() -> io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    set_hook(Box::new(|panic_info| {
        let backtrace = format!("{:?}", Backtrace::new());

        if let Some(reason) = panic_info.payload().downcast_ref::<String>() {
            error!("Retrolink died due to an error: {}\n\n{}", reason, backtrace);
        } else if let Some(reason) = panic_info.payload().downcast_ref::<&str>() {
            error!("Retrolink died due to an error: {}\n\n{}", reason, backtrace);
        } else {
            error!("Retrolink died due to an unknown error.\n\n{}", backtrace);
        }
    }));

    let mut app = app_from_crate!().setting(AppSettings::SubcommandRequiredElseHelp);
    app = project::Project::configure_app(app);
    app = app.arg(
        Arg::with_name("project")
            .long("project")
            .value_name("retrolink.json")
            .takes_value(true)
            .help("The project file to load")
            .set(ArgSettings::Global),
    );

    for cmd in Command::enumerate().iter() {
        app = app.subcommand(cmd.into_clap_subcommand());
    }

    let matches = app.get_matches();

    let project_filename = matches.value_of("project");
    let overrides = project::Project::from_arg_matches(&matches);

    let project = match project::Project::read(Path::new(
        project_filename.unwrap_or("retrolink.json"),
    )) {
        Ok(project) => project,
        Err(Error::Io(ref e)) if e.kind() == io::ErrorKind::NotFound && project_filename.is_none() => {
            project::Project::default()
        }
        Err(e) => return Err(e.into()),
    }
    .apply_override(&overrides);

    let (command, submatches) = matches.subcommand();
    let command = Command::from_str(command).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "Please enter a command")
    })?;

    match (command, submatches) {
        (Command::Watch, _) => cli::watch(&project)?,
        (Command::Identify, Some(submatches)) => cli::identify(&project, submatches)?,
        (Command::Identify, None) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Did not specify a ROM file",
            ))
        }
    };

    Ok(())
}
