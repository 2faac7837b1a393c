//! OS signal wiring for the watcher.
//!
//! The wake signal (SIGALRM) is set to "ignore" at startup, so deliveries
//! outside a wait have no effect on the process. While a [`WakeSignalScope`]
//! is armed, a delivery performs exactly one atomic store on the scope's
//! [`WakeToken`]; the waiting side observes it cooperatively. The previous
//! disposition is restored when the scope drops, on every exit path.
//!
//! Ctrl-C / SIGTERM request clean shutdown through a [`ShutdownToken`] and
//! also wake the current wait so the loop can exit promptly.

use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::Arc;

use crate::error::DaemonError;
use crate::sleeper::{ShutdownToken, WakeToken};

/// Flag the wake-signal handler stores into. Signal dispositions are
/// process-global, so the binding is too. Bound flags are intentionally
/// leaked on rebind: the handler may dereference the pointer at any time,
/// so a previously bound allocation must never be freed.
static HANDLER_FLAG: AtomicPtr<AtomicBool> = AtomicPtr::new(std::ptr::null_mut());

fn bind_handler_flag(token: &WakeToken) {
    let flag = token.flag();
    if HANDLER_FLAG.load(Ordering::SeqCst) == Arc::as_ptr(&flag).cast_mut() {
        return;
    }
    let leaked = Arc::into_raw(flag);
    HANDLER_FLAG.store(leaked.cast_mut(), Ordering::SeqCst);
}

/// Set the wake signal's disposition to "ignore". Called once at startup,
/// before the first pass.
pub fn ignore_wake_signal_at_startup() -> Result<(), DaemonError> {
    imp::set_ignore()
}

/// Install ctrl-c / SIGTERM handling: request shutdown and wake the wait.
///
/// May only be called once per process.
pub fn install_shutdown_handler(
    shutdown: ShutdownToken,
    wake: WakeToken,
) -> Result<(), DaemonError> {
    ctrlc::set_handler(move || {
        shutdown.request();
        wake.wake();
    })
    .map_err(|e| DaemonError::Signal(format!("failed to set shutdown handler: {e}")))
}

/// Armed wake-signal scope. While alive, a wake-signal delivery wakes the
/// bound token; dropping restores the previous disposition.
#[derive(Debug)]
pub struct WakeSignalScope {
    previous: imp::Disposition,
}

impl WakeSignalScope {
    /// Arm the wake signal for `token`. Any wake pending from before the
    /// scope is cleared: deliveries outside the scope have no effect.
    pub fn install(token: &WakeToken) -> Result<Self, DaemonError> {
        bind_handler_flag(token);
        token.clear();
        let previous = imp::install_handler()?;
        Ok(Self { previous })
    }
}

impl Drop for WakeSignalScope {
    fn drop(&mut self) {
        imp::restore(self.previous);
    }
}

#[cfg(unix)]
mod imp {
    use std::sync::atomic::Ordering;

    use super::HANDLER_FLAG;
    use crate::error::DaemonError;

    pub(super) type Disposition = libc::sighandler_t;

    /// Async-signal-safe: one atomic load, one atomic store.
    extern "C" fn on_wake_signal(_signal: libc::c_int) {
        let flag = HANDLER_FLAG.load(Ordering::SeqCst);
        if !flag.is_null() {
            // Safety: bound flags are never freed (see HANDLER_FLAG).
            unsafe { (*flag).store(true, Ordering::SeqCst) };
        }
    }

    pub(super) fn set_ignore() -> Result<(), DaemonError> {
        // Safety: SIG_IGN is a valid disposition for SIGALRM.
        let previous = unsafe { libc::signal(libc::SIGALRM, libc::SIG_IGN) };
        if previous == libc::SIG_ERR {
            return Err(DaemonError::Signal(
                "failed to ignore wake signal".to_owned(),
            ));
        }
        Ok(())
    }

    pub(super) fn install_handler() -> Result<Disposition, DaemonError> {
        // Safety: the handler only performs async-signal-safe operations.
        let previous =
            unsafe { libc::signal(libc::SIGALRM, on_wake_signal as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            return Err(DaemonError::Signal(
                "failed to install wake signal handler".to_owned(),
            ));
        }
        Ok(previous)
    }

    pub(super) fn restore(previous: Disposition) {
        // Safety: restoring a disposition previously returned by signal().
        unsafe { libc::signal(libc::SIGALRM, previous) };
    }
}

#[cfg(not(unix))]
mod imp {
    use crate::error::DaemonError;

    pub(super) type Disposition = ();

    pub(super) fn set_ignore() -> Result<(), DaemonError> {
        Ok(())
    }

    pub(super) fn install_handler() -> Result<Disposition, DaemonError> {
        Ok(())
    }

    pub(super) fn restore(_previous: Disposition) {}
}

/// Serializes tests that touch process-global signal state.
#[cfg(test)]
pub(crate) fn test_signal_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
