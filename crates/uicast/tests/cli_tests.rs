//! CLI surface tests for the uicast binary.

use std::path::Path;
use std::process::Command;
use std::time::Duration;
use std::time::Instant;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn uicast() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("uicast"))
}

fn wait_for(path: &Path) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !path.exists() {
        assert!(Instant::now() < deadline, "socket never appeared");
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_help_describes_the_host() {
    uicast()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("preview host"))
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_completions_bash() {
    uicast()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"))
        .stdout(predicate::str::contains("uicast"));
}

#[test]
fn test_start_reports_unusable_socket_path() {
    uicast()
        .args([
            "start",
            "--socket",
            "/nonexistent-dir/uicast.sock",
            "--frame-socket",
            "/nonexistent-dir/uicast-frame.sock",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Suggestion:"));
}

#[test]
fn test_invalid_stream_mode_is_a_usage_error() {
    uicast()
        .args(["start", "--stream-mode", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("possible values"));
}

#[test]
fn test_second_instance_exits_with_conflict_code() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("cmd.sock");
    let frame_socket = dir.path().join("frames.sock");

    let mut first = uicast()
        .args([
            "start",
            "--socket",
            socket.to_str().unwrap(),
            "--frame-socket",
            frame_socket.to_str().unwrap(),
        ])
        .spawn()
        .unwrap();
    wait_for(&socket);

    uicast()
        .args([
            "start",
            "--socket",
            socket.to_str().unwrap(),
            "--frame-socket",
            frame_socket.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already running"));

    first.kill().unwrap();
    first.wait().unwrap();
}
