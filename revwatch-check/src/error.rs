//! Error types for revwatch-check.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from a reconciliation pass.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The local revision file could not be read. Not retried: a missing
    /// profile means the pass cannot produce a meaningful comparison.
    #[error("failed to read local revision at {}: {}", .path.display(), .source)]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The local revision file had no `.` separator.
    #[error("malformed local revision at {}: missing '.' separator", .path.display())]
    LocalMalformed { path: PathBuf },

    /// A single remote fetch attempt failed at the transport level
    /// (connect error, HTTP error status, or a truncated body read).
    /// Recovered locally by `fetch_with_retry` up to the attempt ceiling.
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The attempt ceiling was reached without one completed transaction.
    #[error("remote history at {url} unreachable after {attempts} attempts")]
    RemoteExhausted { url: String, attempts: u32 },

    /// An I/O error, with annotated path for context (output file writes).
    #[error("I/O error at {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`CheckError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CheckError {
    CheckError::Io {
        path: path.into(),
        source,
    }
}
