//! Domain types for the revwatch watcher.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All types are serializable/deserializable via serde + serde_yaml.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of a normalized (shortened) revision identifier.
pub const SHORT_REVISION_LEN: usize = 11;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed account name that owns a watched channel profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerName(pub String);

impl fmt::Display for OwnerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for OwnerName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OwnerName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl OwnerName {
    /// Whether this owner is the privileged system account.
    pub fn is_privileged(&self) -> bool {
        self.0 == "root"
    }
}

/// A strongly-typed local name for a watched channel profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetName(pub String);

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TargetName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TargetName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed upstream channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelName(pub String);

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ChannelName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One thing being monitored: an owner's locally named profile of an
/// upstream channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTarget {
    pub owner: OwnerName,
    pub name: TargetName,
    pub channel: ChannelName,
}

/// The revision currently installed for a target, parsed from its local
/// state file. Re-read every pass, never cached across passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRevision {
    /// Raw file content, trimmed.
    pub raw: String,
    /// The revision identifier: everything after the last `.` separator.
    pub revision: String,
}

impl LocalRevision {
    /// Parse `<field>.<revision>` state-file content. The revision is the
    /// suffix after the last `.` (version fields may themselves contain
    /// dots). Returns `None` when the separator is absent.
    pub fn parse(contents: &str) -> Option<Self> {
        let raw = contents.trim().to_owned();
        let (_, revision) = raw.rsplit_once('.')?;
        let revision = revision.to_owned();
        Some(Self { raw, revision })
    }

    /// The revision in normalized (shortened) form.
    pub fn short(&self) -> &str {
        short_revision(&self.revision)
    }
}

/// One row of remote revision history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub revision: String,
    pub published_at: DateTime<Utc>,
}

/// Outcome of comparing a local revision against the remote history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// No remote entry matched the local revision.
    Unknown,
    /// The local revision is the latest published one.
    UpToDate,
    /// A newer revision has been published.
    Stale {
        revision: String,
        published_at: DateTime<Utc>,
    },
}

/// Normalize a revision identifier to its comparison form: the first
/// [`SHORT_REVISION_LEN`] bytes. Revisions are ASCII hex in practice;
/// shorter identifiers pass through unchanged.
pub fn short_revision(revision: &str) -> &str {
    match revision.char_indices().nth(SHORT_REVISION_LEN) {
        Some((idx, _)) => &revision[..idx],
        None => revision,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
