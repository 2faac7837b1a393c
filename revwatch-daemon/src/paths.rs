use std::path::{Path, PathBuf};
use std::time::Duration;

/// Logical program name; keys the singleton lock file.
pub const PROGRAM_NAME: &str = "revwatch";

/// Granularity of the cooperative wake check inside a sliced wait.
pub const WAIT_SLICE: Duration = Duration::from_millis(250);

pub fn lock_dir() -> PathBuf {
    std::env::temp_dir()
}

/// `<dir>/<name>.pid`, or `<dir>/<name>_<uid>.pid` when scoped per caller.
pub fn lock_path_at(dir: &Path, name: &str, per_user: bool) -> PathBuf {
    if per_user {
        dir.join(format!("{name}_{}.pid", caller_id()))
    } else {
        dir.join(format!("{name}.pid"))
    }
}

#[cfg(unix)]
fn caller_id() -> u32 {
    // Safety: getuid cannot fail and touches no memory.
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn caller_id() -> u32 {
    0
}
