//! Freshness classification.
//!
//! Variant precedence:
//! 1. `Unknown` (no history entry matches the local revision)
//! 2. `Stale` (a strictly later-published, different revision exists)
//! 3. `UpToDate`

use revwatch_core::{short_revision, Freshness, HistoryEntry, LocalRevision};

/// Classify a local revision against a fetched history.
///
/// Matching uses the normalized (shortened) form on both sides. "Latest" is
/// the maximum-timestamp entry — the feed is not assumed to be sorted.
pub fn classify(local: &LocalRevision, history: &[HistoryEntry]) -> Freshness {
    let local_short = local.short();

    let Some(matched) = history
        .iter()
        .find(|entry| short_revision(&entry.revision) == local_short)
    else {
        return Freshness::Unknown;
    };

    let Some(latest) = history.iter().max_by_key(|entry| entry.published_at) else {
        return Freshness::Unknown;
    };

    if matched.published_at < latest.published_at && short_revision(&latest.revision) != local_short
    {
        return Freshness::Stale {
            revision: short_revision(&latest.revision).to_owned(),
            published_at: latest.published_at,
        };
    }

    Freshness::UpToDate
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn entry(revision: &str, seconds: i64) -> HistoryEntry {
        HistoryEntry {
            revision: revision.to_owned(),
            published_at: at(seconds),
        }
    }

    fn local(revision: &str) -> LocalRevision {
        LocalRevision::parse(&format!("1.{revision}")).expect("parse")
    }

    #[test]
    fn matching_latest_entry_is_up_to_date() {
        let history = vec![entry("abc12345678", 1_700_000_000)];
        assert_eq!(classify(&local("abc12345678"), &history), Freshness::UpToDate);
    }

    #[test]
    fn matching_is_by_shortened_prefix() {
        // Local holds the full hash; the feed publishes full hashes too.
        // Both normalize to the 11-character form.
        let history = vec![entry("abc12345678deadbeefcafe", 1_700_000_000)];
        assert_eq!(
            classify(&local("abc12345678000000"), &history),
            Freshness::UpToDate,
        );
    }

    #[test]
    fn later_different_revision_is_stale_with_id_and_timestamp() {
        let history = vec![
            entry("abc12345678", 1_700_000_000),
            entry("xyz98765432", 1_700_100_000),
        ];
        assert_eq!(
            classify(&local("abc12345678"), &history),
            Freshness::Stale {
                revision: "xyz98765432".to_owned(),
                published_at: at(1_700_100_000),
            },
        );
    }

    #[test]
    fn latest_is_max_timestamp_not_last_line() {
        // Feed order is arbitrary; the newest entry appears first here.
        let history = vec![
            entry("xyz98765432", 1_700_100_000),
            entry("abc12345678", 1_700_000_000),
            entry("old00000000", 1_600_000_000),
        ];
        assert_eq!(
            classify(&local("abc12345678"), &history),
            Freshness::Stale {
                revision: "xyz98765432".to_owned(),
                published_at: at(1_700_100_000),
            },
        );
    }

    #[test]
    fn no_matching_entry_is_unknown() {
        let history = vec![entry("xyz98765432", 1_700_100_000)];
        assert_eq!(classify(&local("abc12345678"), &history), Freshness::Unknown);
    }

    #[test]
    fn empty_history_is_unknown() {
        assert_eq!(classify(&local("abc12345678"), &[]), Freshness::Unknown);
    }

    #[test]
    fn equal_timestamps_are_not_stale() {
        // Staleness requires strictly later publication.
        let history = vec![
            entry("abc12345678", 1_700_000_000),
            entry("xyz98765432", 1_700_000_000),
        ];
        assert_eq!(classify(&local("abc12345678"), &history), Freshness::UpToDate);
    }
}
