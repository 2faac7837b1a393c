//! Watcher configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.revwatch/
//!   config.yaml    (optional — defaults apply when absent)
//! ```
//!
//! # API pattern
//!
//! Loading has two forms:
//! - `load_at(home)` — explicit home; used in tests with `TempDir`
//! - `load()` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrapper; always use `_at`.
//!
//! There is no process-global configuration: a [`WatchConfig`] value is
//! constructed once and passed down into the watcher loop.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{ChannelName, OwnerName, TargetName, WatchTarget};

/// `<home>/.revwatch/` — pure, no I/O.
pub fn revwatch_root(home: &Path) -> PathBuf {
    home.join(".revwatch")
}

/// `<home>/.revwatch/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    revwatch_root(home).join("config.yaml")
}

/// Full watcher configuration. Every field has a default matching the
/// upstream service's polling-politeness contract (15-minute base interval,
/// 1–300 s jitter), so an absent config file yields a working watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Owner/name/channel triples checked sequentially each pass.
    #[serde(default = "default_targets")]
    pub targets: Vec<WatchTarget>,

    /// Root of the per-owner channel profiles.
    #[serde(default = "default_profile_root")]
    pub profile_root: PathBuf,

    /// Base URL of the remote history service; the channel name and
    /// `/history` are appended per target.
    #[serde(default = "default_history_url_base")]
    pub history_url_base: String,

    /// Status message file, truncated at the start of each pass.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Fixed part of the inter-pass delay, in seconds.
    #[serde(default = "default_base_interval_secs")]
    pub base_interval_secs: u64,

    /// Upper bound of the uniform random jitter added to the delay.
    #[serde(default = "default_jitter_bound_secs")]
    pub jitter_bound_secs: u64,

    /// Maximum remote fetch attempts per target per pass.
    #[serde(default = "default_retry_ceiling")]
    pub retry_ceiling: u32,

    /// Cooldown between failed fetch attempts, in seconds.
    #[serde(default = "default_retry_cooldown_secs")]
    pub retry_cooldown_secs: u64,
}

fn default_targets() -> Vec<WatchTarget> {
    vec![WatchTarget {
        owner: OwnerName::from("root"),
        name: TargetName::from("nixos"),
        channel: ChannelName::from("nixos-unstable"),
    }]
}

fn default_profile_root() -> PathBuf {
    PathBuf::from("/nix/var/nix/profiles/per-user")
}

fn default_history_url_base() -> String {
    "https://channels.nix.gsc.io".to_owned()
}

fn default_output_path() -> PathBuf {
    std::env::temp_dir().join("revwatch-update-message.txt")
}

fn default_base_interval_secs() -> u64 {
    15 * 60
}

fn default_jitter_bound_secs() -> u64 {
    5 * 60
}

fn default_retry_ceiling() -> u32 {
    100
}

fn default_retry_cooldown_secs() -> u64 {
    5
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            profile_root: default_profile_root(),
            history_url_base: default_history_url_base(),
            output_path: default_output_path(),
            base_interval_secs: default_base_interval_secs(),
            jitter_bound_secs: default_jitter_bound_secs(),
            retry_ceiling: default_retry_ceiling(),
            retry_cooldown_secs: default_retry_cooldown_secs(),
        }
    }
}

impl WatchConfig {
    /// Load from `<home>/.revwatch/config.yaml`. An absent file yields the
    /// defaults; malformed YAML is `ConfigError::Parse` with path context.
    pub fn load_at(home: &Path) -> Result<Self, ConfigError> {
        let path = config_path_at(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
    }

    /// `load_at` convenience wrapper.
    pub fn load() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Self::load_at(&home)
    }

    /// `<profile_root>/<owner>/channels/<name>/svn-revision` — pure, no I/O.
    pub fn local_revision_path(&self, target: &WatchTarget) -> PathBuf {
        self.profile_root
            .join(&target.owner.0)
            .join("channels")
            .join(&target.name.0)
            .join("svn-revision")
    }

    /// `<history_url_base>/<channel>/history` — pure, no I/O.
    pub fn history_url(&self, channel: &ChannelName) -> String {
        format!(
            "{}/{}/history",
            self.history_url_base.trim_end_matches('/'),
            channel
        )
    }
}
