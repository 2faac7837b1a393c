//! `revwatch run` — foreground watcher loop.

use anyhow::{Context, Result};
use clap::Args;

use revwatch_core::WatchConfig;
use revwatch_daemon::{start_blocking, DaemonError};

/// Arguments for `revwatch run`.
#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = WatchConfig::load_at(&home).context("failed to load watcher config")?;

        match start_blocking(&config) {
            Ok(()) => Ok(()),
            Err(DaemonError::AlreadyRunning { path }) => anyhow::bail!(
                "another revwatch instance is already running (lock: {})",
                path.display(),
            ),
            Err(err) => Err(err).context("watcher exited with error"),
        }
    }
}
