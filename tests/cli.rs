//! CLI test cases.
//!
//! The worker's OCR paths need `tesseract` and `pdftoppm` installed, so they
//! are covered by in-crate tests with engine doubles. Here we exercise the
//! real binary's surface: argument parsing, `submit`, and `status`.

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

/// Create a new `Command` with our binary.
fn cmd() -> Command {
    Command::cargo_bin("ocr-spool").unwrap()
}

/// Storage arguments pointing every directory into `data`.
fn storage_args(data: &std::path::Path) -> Vec<String> {
    vec![
        "--upload-dir".to_owned(),
        data.join("uploads").display().to_string(),
        "--result-dir".to_owned(),
        data.join("results").display().to_string(),
        "--queue-dir".to_owned(),
        data.join("queue").display().to_string(),
        "--status-dir".to_owned(),
        data.join("status").display().to_string(),
    ]
}

#[test]
fn test_help() {
    cmd().arg("--help").assert().success();
}

#[test]
fn test_version() {
    cmd().arg("--version").assert().success();
}

#[test]
fn test_submit_and_status_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    let data = tmp.path();
    let input = data.join("scan.png");
    std::fs::write(&input, b"fake image data").unwrap();

    let output = cmd()
        .arg("submit")
        .args(storage_args(data))
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());
    let job_id = String::from_utf8(output.stdout).unwrap().trim().to_owned();
    assert!(!job_id.is_empty());

    // The job is visible as `queued` before any worker runs.
    cmd()
        .arg("status")
        .args(storage_args(data))
        .arg(&job_id)
        .assert()
        .success()
        .stdout(predicate::str::contains("queued"))
        .stdout(predicate::str::contains("scan.png"));
}

#[test]
fn test_status_for_unknown_job_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    cmd()
        .arg("status")
        .args(storage_args(tmp.path()))
        .arg("not-a-job")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no status record"));
}

#[test]
fn test_submit_missing_file_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    cmd()
        .arg("submit")
        .args(storage_args(tmp.path()))
        .arg(tmp.path().join("does-not-exist.png"))
        .assert()
        .failure();
}
