//! Interruptible waiting.
//!
//! The watcher's idle wait is a sliced blocking sleep that checks a shared
//! [`WakeToken`] at [`WAIT_SLICE`](crate::paths::WAIT_SLICE) granularity.
//! A wake shortens the in-progress wait and is swallowed at that boundary;
//! it is never observable as an error. Waking never cancels in-flight
//! network attempts or the retry cooldown — only the idle wait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::paths::WAIT_SLICE;

/// A wait duration, given either as a raw seconds count or as a structured
/// span. Both normalize to the same underlying wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitSpan {
    Secs(u64),
    Span(Duration),
}

impl From<u64> for WaitSpan {
    fn from(secs: u64) -> Self {
        Self::Secs(secs)
    }
}

impl From<Duration> for WaitSpan {
    fn from(span: Duration) -> Self {
        Self::Span(span)
    }
}

impl WaitSpan {
    fn into_duration(self) -> Duration {
        match self {
            Self::Secs(secs) => Duration::from_secs(secs),
            Self::Span(span) => span,
        }
    }
}

/// How a [`WakeToken::sleep`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration elapsed.
    Completed,
    /// The wait was cut short by a wake; the wake has been consumed.
    Woken,
}

/// Shared cancellation token for the idle wait.
///
/// Handlers (signal, ctrl-c) only ever perform the atomic store in
/// [`wake`](Self::wake); the waiting side polls cooperatively.
#[derive(Debug, Clone, Default)]
pub struct WakeToken {
    woken: Arc<AtomicBool>,
}

impl WakeToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the in-progress (or next) wait end early.
    pub fn wake(&self) {
        self.woken.store(true, Ordering::SeqCst);
    }

    pub fn is_woken(&self) -> bool {
        self.woken.load(Ordering::SeqCst)
    }

    /// Drop any pending wake. Called when a wake scope is armed, so
    /// requests delivered outside the scope have no effect inside it.
    pub fn clear(&self) {
        self.woken.store(false, Ordering::SeqCst);
    }

    /// The underlying flag, for binding to the process-global signal
    /// handler.
    pub(crate) fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.woken)
    }

    /// Block for `span`, checking for a wake once per slice.
    pub fn sleep(&self, span: impl Into<WaitSpan>) -> SleepOutcome {
        let deadline = Instant::now() + span.into().into_duration();
        loop {
            if self.is_woken() {
                self.clear();
                return SleepOutcome::Woken;
            }
            let now = Instant::now();
            if now >= deadline {
                return SleepOutcome::Completed;
            }
            std::thread::sleep((deadline - now).min(WAIT_SLICE));
        }
    }
}

/// Shared flag requesting clean loop exit.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Uniform jitter source for the inter-pass delay: xorshift64 seeded from
/// the clock and PID.
#[derive(Debug)]
pub struct Jitter {
    state: u64,
}

impl Jitter {
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        // Zero is a fixed point of the xorshift step.
        let state = (nanos ^ u64::from(std::process::id()).rotate_left(32)) | 1;
        Self { state }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform draw in `[1, bound]` seconds; `0` when the bound is zero.
    pub fn next_secs(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        1 + self.next() % bound
    }
}
