//! End-to-end CLI tests driving the built `fsacct` binary against real
//! fixture directory trees.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn fsacct() -> Command {
    Command::cargo_bin("fsacct").unwrap()
}

#[test]
fn reports_files_and_bytes_for_a_small_tree() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a"), b"hello").unwrap();
    fs::write(dir.path().join("b"), b"world!").unwrap();

    fsacct()
        .arg(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains(dir.path().to_string_lossy().into_owned()));
}

#[test]
fn exclude_pattern_drops_matching_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("keep.txt"), b"12345").unwrap();
    fs::write(dir.path().join("drop.tmp"), vec![0u8; 500]).unwrap();

    let assert = fsacct()
        .arg(dir.path())
        .arg("--exclude")
        .arg(r".*\.tmp")
        .arg("--quiet")
        .assert()
        .success();

    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(output.contains("5"));
    assert!(!output.contains("500"));
}

#[test]
fn human_readable_flag_renders_binary_units() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("big"), vec![0u8; 2_000_000]).unwrap();

    fsacct()
        .arg(dir.path())
        .arg("--human-readable")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"\d+(\.\d+)? M").unwrap());
}

#[test]
fn missing_path_exits_nonzero_with_message() {
    fsacct()
        .arg("/definitely/does/not/exist/fsacct-cli-test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn per_user_flag_adds_a_user_column_to_the_header() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("f"), b"x").unwrap();

    fsacct()
        .arg(dir.path())
        .arg("--user")
        .assert()
        .success()
        .stdout(predicate::str::contains("user"));
}
