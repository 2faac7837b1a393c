//! Revwatch — channel update watcher CLI.
//!
//! # Usage
//!
//! ```text
//! revwatch run
//! revwatch check [--json]
//! revwatch status
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, run::RunArgs, status::StatusArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "revwatch",
    version,
    about = "Watch installed channel revisions and report pending updates",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the watcher loop in the foreground (one instance per machine).
    Run(RunArgs),

    /// Run exactly one reconciliation pass and print the outcomes.
    Check(CheckArgs),

    /// Print the current status message file.
    Status(StatusArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Check(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
