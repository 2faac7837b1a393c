//! Singleton instance lock.
//!
//! An advisory exclusive lock on `<temp>/<name>.pid` guarantees at most one
//! watcher per name (optionally per user). The holder's PID is written into
//! the file as a diagnostic payload. Releasing unlocks but never deletes,
//! so the last holder's PID stays visible.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{io_err, DaemonError};
use crate::paths::{lock_dir, lock_path_at};

/// Exclusive instance lock, held for the lifetime of this struct.
///
/// Acquisition is non-blocking: a held lock fails immediately with
/// [`DaemonError::AlreadyRunning`]. This is a single-instance guarantee,
/// not a mutex for coordinating work.
#[derive(Debug)]
pub struct PidLock {
    file: File,
    path: PathBuf,
}

impl PidLock {
    /// Acquire the lock under an explicit directory (tests use `TempDir`).
    pub fn acquire_at(dir: &Path, name: &str, per_user: bool) -> Result<Self, DaemonError> {
        let path = lock_path_at(dir, name, per_user);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|e| io_err(&path, e))?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                return Err(DaemonError::AlreadyRunning { path });
            }
            Err(err) => return Err(io_err(&path, err)),
        }

        // Lock held from here on: replace the previous holder's payload.
        file.set_len(0).map_err(|e| io_err(&path, e))?;
        let mut writer = &file;
        write!(writer, "{}", std::process::id()).map_err(|e| io_err(&path, e))?;
        writer.flush().map_err(|e| io_err(&path, e))?;

        Ok(Self { file, path })
    }

    /// `acquire_at` convenience wrapper using the system temp directory.
    pub fn acquire(name: &str, per_user: bool) -> Result<Self, DaemonError> {
        Self::acquire_at(&lock_dir(), name, per_user)
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidLock {
    fn drop(&mut self) {
        // Unlock only; the file and its PID payload persist.
        let _ = self.file.unlock();
    }
}
