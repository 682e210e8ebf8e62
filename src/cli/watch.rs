//! CLI command: watch

use crate::driver::Driver;
use crate::memory::BridgeConnector;
use crate::platform::GameData;
use crate::project::Project;
use crate::protocol::PipeCoordinator;
use log::info;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn watch(project: &Project) -> io::Result<()> {
    let data = GameData::read(&project.data_path())?;
    let mut port = BridgeConnector::new(project.bridge_host());
    if let Some(bridge_port) = project.bridge_port() {
        port = port.with_ports(bridge_port..=bridge_port);
    }

    let coordinator = PipeCoordinator::stdout(&project.session_path());
    let mut driver = Driver::new(
        port,
        coordinator,
        data,
        project.interval(),
        project.revalidate_every(),
    )?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let handler_cancelled = cancelled.clone();
    ctrlc::set_handler(move || handler_cancelled.store(true, Ordering::SeqCst))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    info!(
        "Watching for the emulator on {} every {:?}",
        project.bridge_host(),
        driver.interval()
    );

    driver.run(&cancelled)?;

    Ok(())
}
