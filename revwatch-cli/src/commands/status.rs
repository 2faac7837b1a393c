//! `revwatch status` — print the current status message file.

use anyhow::{Context, Result};
use clap::Args;

use revwatch_core::WatchConfig;

/// Arguments for `revwatch status`.
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = WatchConfig::load_at(&home).context("failed to load watcher config")?;

        let path = &config.output_path;
        if !path.exists() {
            println!(
                "no status file at {} — run `revwatch run` or `revwatch check` first",
                path.display(),
            );
            return Ok(());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read status file at {}", path.display()))?;
        if contents.trim().is_empty() {
            println!("All watched channels are up to date.");
        } else {
            print!("{contents}");
        }
        Ok(())
    }
}
