//! Watcher daemon runtime: singleton lock, interruptible wait, pass loop.

mod error;
pub mod lock;
pub mod paths;
mod runtime;
pub mod signals;
pub mod sleeper;

pub use error::DaemonError;
pub use lock::PidLock;
pub use runtime::{run, start_blocking};
pub use sleeper::{Jitter, ShutdownToken, SleepOutcome, WaitSpan, WakeToken};
