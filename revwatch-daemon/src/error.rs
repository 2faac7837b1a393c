use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the watcher runtime, lock, and signal wiring.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("another watcher instance is already running (lock held at {})", .path.display())]
    AlreadyRunning { path: PathBuf },

    #[error("check error: {0}")]
    Check(#[from] revwatch_check::CheckError),

    #[error("config error: {0}")]
    Config(#[from] revwatch_core::ConfigError),

    #[error("signal wiring error: {0}")]
    Signal(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
