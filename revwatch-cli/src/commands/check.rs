//! `revwatch check` — one reconciliation pass, human or JSON output.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use revwatch_check::{pass, TargetOutcome};
use revwatch_core::{Freshness, WatchConfig};

/// Arguments for `revwatch check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = WatchConfig::load_at(&home).context("failed to load watcher config")?;

        let outcomes = pass::run(&config).context("check pass failed")?;

        if self.json {
            print_json(&config, &outcomes)?;
        } else {
            print_table(&config, &outcomes);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CheckReportJson {
    output_path: String,
    stale: usize,
    targets: Vec<TargetOutcome>,
}

#[derive(Tabled)]
struct CheckTableRow {
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "channel")]
    channel: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_json(config: &WatchConfig, outcomes: &[TargetOutcome]) -> Result<()> {
    let payload = CheckReportJson {
        output_path: config.output_path.display().to_string(),
        stale: stale_count(outcomes),
        targets: outcomes.to_vec(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize check JSON")?
    );
    Ok(())
}

fn print_table(config: &WatchConfig, outcomes: &[TargetOutcome]) {
    println!(
        "Revwatch v{} | {} targets | {} stale",
        env!("CARGO_PKG_VERSION"),
        outcomes.len(),
        stale_count(outcomes),
    );

    if outcomes.is_empty() {
        println!("No targets configured.");
        return;
    }

    let rows: Vec<CheckTableRow> = outcomes
        .iter()
        .map(|outcome| CheckTableRow {
            target: format!("{}/{}", outcome.target.owner, outcome.target.name),
            channel: outcome.target.channel.to_string(),
            status: freshness_label(&outcome.freshness).to_string(),
            detail: freshness_detail(&outcome.freshness),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if stale_count(outcomes) > 0 {
        println!(
            "{} status message written to {}",
            "→".bold(),
            config.output_path.display(),
        );
    }
}

fn stale_count(outcomes: &[TargetOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|o| matches!(o.freshness, Freshness::Stale { .. }))
        .count()
}

fn freshness_label(freshness: &Freshness) -> String {
    match freshness {
        Freshness::UpToDate => "UP TO DATE".green().bold().to_string(),
        Freshness::Stale { .. } => "STALE".yellow().bold().to_string(),
        Freshness::Unknown => "UNKNOWN".red().bold().to_string(),
    }
}

fn freshness_detail(freshness: &Freshness) -> String {
    match freshness {
        Freshness::UpToDate => "installed revision is the latest published".to_string(),
        Freshness::Unknown => "no remote entry matches the installed revision".to_string(),
        Freshness::Stale {
            revision,
            published_at,
        } => format!(
            "newer revision {revision} published {}",
            published_at.format("%Y-%m-%d %H:%M:%S"),
        ),
    }
}
