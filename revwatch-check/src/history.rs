//! Remote history fetch with bounded retry.
//!
//! The history endpoint returns newline-delimited `<revision> <unix-seconds>`
//! pairs in arbitrary order. A fetch is "successful" when the HTTP
//! transaction completes and the body is fully read — whether or not any
//! entry matches the local revision. Only transport failures consume retry
//! budget.

use std::time::Duration;

use chrono::DateTime;

use revwatch_core::HistoryEntry;

use crate::error::CheckError;

/// Retry parameters for a remote query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of fetch attempts.
    pub ceiling: u32,
    /// Fixed cooldown between failed attempts.
    pub cooldown: Duration,
}

/// Parse a history body. Lines that do not hold a `<revision> <unix-seconds>`
/// pair are skipped: the feed is line-oriented and append-only, so one bad
/// row must not poison the rest of the stream.
pub fn parse_history(body: &str) -> Vec<HistoryEntry> {
    body.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<HistoryEntry> {
    let mut fields = line.split_whitespace();
    let revision = fields.next()?;
    let seconds: i64 = fields.next()?.parse().ok()?;
    let published_at = DateTime::from_timestamp(seconds, 0)?;
    Some(HistoryEntry {
        revision: revision.to_owned(),
        published_at,
    })
}

/// Perform one GET of the history URL and parse the full body.
pub fn fetch_history(agent: &ureq::Agent, url: &str) -> Result<Vec<HistoryEntry>, CheckError> {
    let response = agent.get(url).call().map_err(|e| CheckError::Transport {
        url: url.to_owned(),
        source: Box::new(e),
    })?;
    let body = response.into_string().map_err(|e| CheckError::Transport {
        url: url.to_owned(),
        source: Box::new(e),
    })?;
    Ok(parse_history(&body))
}

/// Run `fetch` until it completes a transaction, retrying transport failures
/// with a fixed cooldown, up to `policy.ceiling` attempts.
///
/// Generic over the fetch so tests can exercise the retry contract without a
/// network. Non-transport errors propagate immediately.
pub fn fetch_with_retry<F>(
    policy: &RetryPolicy,
    url: &str,
    mut fetch: F,
) -> Result<Vec<HistoryEntry>, CheckError>
where
    F: FnMut() -> Result<Vec<HistoryEntry>, CheckError>,
{
    for attempt in 1..=policy.ceiling {
        match fetch() {
            Ok(entries) => return Ok(entries),
            Err(CheckError::Transport { url, source }) => {
                tracing::warn!(
                    "fetch attempt {attempt}/{} for {url} failed: {source}",
                    policy.ceiling
                );
                if attempt < policy.ceiling {
                    std::thread::sleep(policy.cooldown);
                }
            }
            Err(other) => return Err(other),
        }
    }
    Err(CheckError::RemoteExhausted {
        url: url.to_owned(),
        attempts: policy.ceiling,
    })
}
