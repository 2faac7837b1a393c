//! Local revision state.
//!
//! The installed revision for a target lives in a small text file under the
//! owner's channel profile (`.../channels/<name>/svn-revision`), holding
//! `<version>.<revision>`. It is re-read on every pass.

use std::path::Path;

use revwatch_core::LocalRevision;

use crate::error::CheckError;

/// Read and parse the local revision file for a target.
///
/// A missing file is [`CheckError::LocalRead`]; content without a `.`
/// separator is [`CheckError::LocalMalformed`]. Both abort the run.
pub fn read_local_revision(path: &Path) -> Result<LocalRevision, CheckError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CheckError::LocalRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    LocalRevision::parse(&contents).ok_or_else(|| CheckError::LocalMalformed {
        path: path.to_path_buf(),
    })
}
