//! Shared reconciliation-pass entrypoint used by CLI and daemon.
//!
//! One pass: truncate the output file, then for each configured target
//! read local state → fetch remote history (bounded retry) → classify →
//! append the rendered message. Targets are processed sequentially and
//! share the output file; nothing is cached across passes.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use revwatch_core::{Freshness, WatchConfig, WatchTarget};

use crate::error::{io_err, CheckError};
use crate::history::{fetch_history, fetch_with_retry, RetryPolicy};
use crate::{freshness, local, message};

/// Outcome of checking a single target within a pass.
#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    pub target: WatchTarget,
    pub freshness: Freshness,
}

/// Run one full pass over every configured target.
///
/// This is the canonical check entrypoint for both `revwatch check` and the
/// watcher daemon. Errors abort the pass where they occur: earlier targets'
/// messages stay in the output file, later targets are not reached.
pub fn run(config: &WatchConfig) -> Result<Vec<TargetOutcome>, CheckError> {
    let agent = ureq::agent();
    let policy = RetryPolicy {
        ceiling: config.retry_ceiling,
        cooldown: Duration::from_secs(config.retry_cooldown_secs),
    };

    // Truncate once per pass; each target appends its own section.
    File::create(&config.output_path).map_err(|e| io_err(&config.output_path, e))?;

    let mut outcomes = Vec::with_capacity(config.targets.len());
    for target in &config.targets {
        let outcome = check_target(config, &agent, &policy, target)?;
        tracing::info!(
            "checked {}/{} against {}: {:?}",
            target.owner,
            target.name,
            target.channel,
            outcome.freshness,
        );
        if let Some(text) = message::render(target, &outcome.freshness) {
            append_output(&config.output_path, &text)?;
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn check_target(
    config: &WatchConfig,
    agent: &ureq::Agent,
    policy: &RetryPolicy,
    target: &WatchTarget,
) -> Result<TargetOutcome, CheckError> {
    let local_path = config.local_revision_path(target);
    let local = local::read_local_revision(&local_path)?;

    let url = config.history_url(&target.channel);
    let history = fetch_with_retry(policy, &url, || fetch_history(agent, &url))?;

    let freshness = freshness::classify(&local, &history);
    Ok(TargetOutcome {
        target: target.clone(),
        freshness,
    })
}

fn append_output(path: &Path, text: &str) -> Result<(), CheckError> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    file.write_all(text.as_bytes()).map_err(|e| io_err(path, e))?;
    file.flush().map_err(|e| io_err(path, e))
}
