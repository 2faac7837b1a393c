//! Status message rendering.
//!
//! The output file is consumed by status bars and login banners, so lines
//! are folded at a fixed column. Wording is stable: downstream tooling greps
//! for it.

use chrono::{DateTime, Utc};

use revwatch_core::{Freshness, WatchTarget};

/// Written verbatim when the remote history held no matching entry.
pub const UNKNOWN_WARNING: &str = "Failure to get channel info, there might be updates.\n";

/// Column at which status messages are folded.
pub const FOLD_COLUMN: usize = 60;

const REMEDIAL_COMMAND: &str = "sudo nixos-rebuild switch --upgrade";

/// Render the message for one target's freshness outcome.
///
/// `UpToDate` renders nothing; `Unknown` renders the fixed warning line;
/// `Stale` renders a folded multi-field message, with a remedial command
/// suggestion when the owner is the privileged account.
pub fn render(target: &WatchTarget, freshness: &Freshness) -> Option<String> {
    match freshness {
        Freshness::UpToDate => None,
        Freshness::Unknown => Some(UNKNOWN_WARNING.to_owned()),
        Freshness::Stale {
            revision,
            published_at,
        } => Some(stale_message(target, revision, *published_at)),
    }
}

fn stale_message(target: &WatchTarget, revision: &str, published_at: DateTime<Utc>) -> String {
    let mut parts = vec![
        format!(
            "Channel {} ({}) for {} is out-of-date.",
            target.channel, target.name, target.owner
        ),
        format!(
            "Latest revision is {revision}, from {}.",
            published_at.format("%Y-%m-%d %H:%M:%S")
        ),
    ];

    if target.owner.is_privileged() {
        parts.push(format!(
            "Suggested course of action: run `{REMEDIAL_COMMAND}`"
        ));
    }

    let mut message = fill(&parts.join("  "), FOLD_COLUMN);
    message.push('\n');
    message
}

/// Greedy paragraph fill: collapse whitespace, then pack words into lines of
/// at most `width` columns. Words longer than `width` get a line of their
/// own rather than being split.
pub fn fill(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}
