//! CLI integration tests for `revwatch check` and `revwatch status`.
//!
//! Every invocation points HOME at a `TempDir` so the real user config and
//! profiles are never touched; the remote side is a loopback HTTP fixture.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use assert_cmd::Command;
use predicates::prelude::predicate;
use tempfile::TempDir;

fn revwatch(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("revwatch").expect("binary");
    cmd.env("HOME", home.path()).env("USERPROFILE", home.path());
    cmd
}

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

/// Write `~/.revwatch/config.yaml` pointing every path into the temp home.
fn write_config(home: &TempDir, history_url_base: &str) {
    let dir = home.path().join(".revwatch");
    fs::create_dir_all(&dir).expect("mkdir .revwatch");
    fs::write(
        dir.join("config.yaml"),
        format!(
            concat!(
                "targets:\n",
                "  - owner: root\n",
                "    name: nixos\n",
                "    channel: nixos-unstable\n",
                "profile_root: {profiles}\n",
                "history_url_base: {base}\n",
                "output_path: {output}\n",
                "retry_ceiling: 3\n",
                "retry_cooldown_secs: 0\n",
            ),
            profiles = home.path().join("profiles").display(),
            base = history_url_base,
            output = home.path().join("update-message.txt").display(),
        ),
    )
    .expect("write config");
}

fn write_local_revision(home: &TempDir, contents: &str) {
    let dir = home
        .path()
        .join("profiles")
        .join("root")
        .join("channels")
        .join("nixos");
    fs::create_dir_all(&dir).expect("mkdir profile");
    fs::write(dir.join("svn-revision"), contents).expect("write revision");
}

fn output_path(home: &TempDir) -> std::path::PathBuf {
    home.path().join("update-message.txt")
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().expect("home");
    revwatch(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn check_reports_stale_and_writes_the_message_file() {
    let home = TempDir::new().expect("home");
    let base = serve_history("abc12345678 1700000000\nxyz98765432 1700100000\n");
    write_config(&home, &base);
    write_local_revision(&home, "1.abc12345678\n");

    revwatch(&home)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("STALE"))
        .stdout(predicate::str::contains("1 stale"));

    let message = fs::read_to_string(output_path(&home)).expect("read output");
    assert!(message.contains("xyz98765432"), "message: {message:?}");
}

#[test]
fn check_json_is_machine_readable() {
    let home = TempDir::new().expect("home");
    let base = serve_history("abc12345678 1700000000\nxyz98765432 1700100000\n");
    write_config(&home, &base);
    write_local_revision(&home, "1.abc12345678\n");

    let output = revwatch(&home)
        .arg("check")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(payload["stale"], serde_json::json!(1));
    assert_eq!(payload["targets"][0]["target"]["owner"], serde_json::json!("root"));
}

#[test]
fn check_fails_on_missing_local_revision() {
    let home = TempDir::new().expect("home");
    let base = serve_history("abc12345678 1700000000\n");
    write_config(&home, &base);
    // No local revision file written.

    revwatch(&home)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("local revision"));
}

#[test]
fn status_before_any_pass_explains_itself() {
    let home = TempDir::new().expect("home");
    write_config(&home, "http://revwatch.invalid");

    revwatch(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("no status file"));
}

#[test]
fn status_with_empty_file_reports_up_to_date() {
    let home = TempDir::new().expect("home");
    write_config(&home, "http://revwatch.invalid");
    fs::write(output_path(&home), "").expect("write empty output");

    revwatch(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn status_prints_the_message_verbatim() {
    let home = TempDir::new().expect("home");
    write_config(&home, "http://revwatch.invalid");
    fs::write(
        output_path(&home),
        "Channel nixos-unstable (nixos) for root is out-of-date.\n",
    )
    .expect("write output");

    revwatch(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("out-of-date"));
}

#[test]
fn run_refuses_to_start_a_second_instance() {
    let home = TempDir::new().expect("home");
    write_config(&home, "http://revwatch.invalid");

    // Hold the system-wide lock the way a running watcher would.
    let _held = revwatch_daemon::PidLock::acquire(revwatch_daemon::paths::PROGRAM_NAME, false)
        .expect("hold instance lock");

    revwatch(&home)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already running"));
}
