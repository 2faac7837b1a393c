//! Watcher runtime: singleton lock + pass/wait loop.

use revwatch_check::pass;
use revwatch_core::WatchConfig;

use crate::error::DaemonError;
use crate::lock::PidLock;
use crate::paths::PROGRAM_NAME;
use crate::signals::{self, WakeSignalScope};
use crate::sleeper::{Jitter, ShutdownToken, SleepOutcome, WakeToken};

/// Run the watcher in the foreground until shutdown or a fatal error.
///
/// Acquires the singleton lock for the whole run, sets the wake signal to
/// ignore, wires shutdown handling, then delegates to [`run`]. The lock is
/// released on every exit path, including errors.
pub fn start_blocking(config: &WatchConfig) -> Result<(), DaemonError> {
    init_tracing();

    let lock = PidLock::acquire(PROGRAM_NAME, false)?;
    tracing::info!(
        lock = %lock.path().display(),
        pid = std::process::id(),
        "watcher instance lock acquired",
    );

    signals::ignore_wake_signal_at_startup()?;

    let wake = WakeToken::new();
    let shutdown = ShutdownToken::new();
    signals::install_shutdown_handler(shutdown.clone(), wake.clone())?;

    run(config, &wake, &shutdown)
}

/// The reconciliation loop: pass → wait → pass, forever.
///
/// Terminal only on a fatal pass error (local-read failure, retry
/// exhaustion) or when `shutdown` is requested. The wait is the sole
/// suspension point per cycle besides network I/O, and the only one the
/// wake signal can shorten.
pub fn run(
    config: &WatchConfig,
    wake: &WakeToken,
    shutdown: &ShutdownToken,
) -> Result<(), DaemonError> {
    let mut jitter = Jitter::from_clock();

    loop {
        let outcomes = pass::run(config)?;
        tracing::info!(targets = outcomes.len(), "pass complete");

        if shutdown.is_requested() {
            tracing::info!("shutdown requested, exiting watcher loop");
            return Ok(());
        }

        let jitter_secs = jitter.next_secs(config.jitter_bound_secs);
        let total_secs = config.base_interval_secs + jitter_secs;
        tracing::info!(
            base_secs = config.base_interval_secs,
            jitter_secs,
            total_secs,
            "sleeping until next pass",
        );

        let scope = WakeSignalScope::install(wake)?;
        // Arming cleared pending wakes; a shutdown that slipped in between
        // the check above and the arm must not be slept through.
        if shutdown.is_requested() {
            tracing::info!("shutdown requested, exiting watcher loop");
            return Ok(());
        }
        if wake.sleep(total_secs) == SleepOutcome::Woken {
            tracing::info!("wait cut short, starting next pass early");
        }
        drop(scope);

        if shutdown.is_requested() {
            tracing::info!("shutdown requested, exiting watcher loop");
            return Ok(());
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::{Duration, Instant};

    use revwatch_core::types::{ChannelName, OwnerName, TargetName, WatchTarget};
    use tempfile::TempDir;

    use super::*;

    fn serve_history(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut buf = [0u8; 1024];
                let mut head = Vec::new();
                loop {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            head.extend_from_slice(&buf[..n]);
                            if head.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body,
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    fn loop_config(home: &TempDir) -> WatchConfig {
        let target = WatchTarget {
            owner: OwnerName::from("root"),
            name: TargetName::from("nixos"),
            channel: ChannelName::from("nixos-unstable"),
        };
        let profile_dir = home
            .path()
            .join("profiles")
            .join("root")
            .join("channels")
            .join("nixos");
        fs::create_dir_all(&profile_dir).expect("mkdir profile");
        fs::write(profile_dir.join("svn-revision"), "1.abc12345678\n").expect("write revision");

        WatchConfig {
            targets: vec![target],
            profile_root: home.path().join("profiles"),
            history_url_base: serve_history("abc12345678 1700000000\n"),
            output_path: home.path().join("update-message.txt"),
            base_interval_secs: 3600,
            jitter_bound_secs: 10,
            retry_ceiling: 3,
            retry_cooldown_secs: 0,
        }
    }

    #[test]
    fn loop_exits_cleanly_when_shutdown_arrives_during_the_wait() {
        let _guard = crate::signals::test_signal_guard();
        let home = TempDir::new().expect("home");
        let config = loop_config(&home);

        let wake = WakeToken::new();
        let shutdown = ShutdownToken::new();

        let waker = wake.clone();
        let stopper = shutdown.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            stopper.request();
            waker.wake();
        });

        let started = Instant::now();
        run(&config, &wake, &shutdown).expect("clean exit");
        handle.join().expect("stopper thread");

        assert!(
            started.elapsed() < Duration::from_secs(30),
            "an hour-long wait must be cut short by shutdown, took {:?}",
            started.elapsed(),
        );
        assert_eq!(
            fs::read_to_string(&config.output_path).expect("read output"),
            "",
            "up-to-date target leaves the output empty",
        );
    }

    #[test]
    fn pre_requested_shutdown_stops_after_one_pass() {
        let _guard = crate::signals::test_signal_guard();
        let home = TempDir::new().expect("home");
        let config = loop_config(&home);

        let wake = WakeToken::new();
        let shutdown = ShutdownToken::new();
        shutdown.request();

        run(&config, &wake, &shutdown).expect("single pass then exit");
        assert!(config.output_path.exists(), "the pass truncated the output file");
    }
}
