//! Command-line interface tests

mod test_helpers;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use test_helpers::{fist, recording_line};

fn handtyped(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("handtyped").unwrap();
    cmd.current_dir(dir.path())
        .env("RUST_LOG", "error")
        .arg("--store")
        .arg(dir.path().join("gestures.json"));
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("handtyped")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("capture"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_list_empty_store() {
    let dir = TempDir::new().unwrap();
    handtyped(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No gestures stored"));
}

#[test]
fn test_capture_list_run_delete() {
    let dir = TempDir::new().unwrap();
    let recording = dir.path().join("fist.jsonl");
    std::fs::write(&recording, format!("{}\n{}\n", recording_line(&fist()), recording_line(&fist()))).unwrap();

    handtyped(&dir)
        .args(["capture", "--name", "fist", "--key", "space", "--frames"])
        .arg(&recording)
        .assert()
        .success()
        .stdout(predicate::str::contains("Gesture saved: fist → space"));

    handtyped(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("fist\tspace\t21 landmarks"));

    handtyped(&dir)
        .args(["--dry-run", "run", "--frames"])
        .arg(&recording)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 frames, 2 matched, 1 key presses"));

    handtyped(&dir)
        .args(["delete", "--name", "fist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted gesture fist"));

    handtyped(&dir)
        .args(["delete", "--name", "fist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No gesture named fist"));
}

#[test]
fn test_run_stops_at_quit_gesture() {
    let dir = TempDir::new().unwrap();
    let recording = dir.path().join("fist.jsonl");
    let line = recording_line(&fist());
    std::fs::write(&recording, format!("{line}\n{line}\n{line}\n")).unwrap();

    handtyped(&dir)
        .args(["capture", "--name", "fist", "--key", "space", "--frames"])
        .arg(&recording)
        .assert()
        .success();

    handtyped(&dir)
        .args(["--dry-run", "run", "--quit-gesture", "fist", "--frames"])
        .arg(&recording)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 frames, 0 matched, 0 key presses"));
}

#[test]
fn test_capture_without_hand_fails() {
    let dir = TempDir::new().unwrap();
    let recording = dir.path().join("empty.jsonl");
    std::fs::write(&recording, "[]\n").unwrap();

    handtyped(&dir)
        .args(["capture", "--name", "none", "--key", "a", "--frames"])
        .arg(&recording)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no hand detected"));
}

#[test]
fn test_invalid_threshold_rejected() {
    let dir = TempDir::new().unwrap();
    handtyped(&dir)
        .args(["--threshold", "0", "list"])
        .assert()
        .failure();
}

#[test]
fn test_init_config_writes_example() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("handtyped.yaml");
    handtyped(&dir)
        .args(["init-config", "--output"])
        .arg(&output)
        .assert()
        .success();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("threshold: 0.15"));
}
