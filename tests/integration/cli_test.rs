//! Integration tests for the geoshrink binary
//!
//! These never need mapshaper: they cover argument handling, dry runs and
//! runs where every file is already small enough.

use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::tempdir;

fn run_geoshrink(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_geoshrink"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to run geoshrink");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    (stdout, stderr, output.status.success())
}

fn sized_file(path: &Path, bytes: u64) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    File::create(path).unwrap().set_len(bytes).unwrap();
}

#[test]
fn test_missing_data_dir_fails() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("data");

    let (_, stderr, success) = run_geoshrink(&[missing.to_str().unwrap(), "--dry-run"]);
    assert!(!success);
    assert!(stderr.contains("data directory not found"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_threshold_fails() {
    let tmp = tempdir().unwrap();
    let (_, stderr, success) =
        run_geoshrink(&[tmp.path().to_str().unwrap(), "--max-size-mb", "0", "--dry-run"]);
    assert!(!success);
    assert!(stderr.contains("invalid configuration"), "stderr: {}", stderr);
}

#[test]
fn test_dry_run_reports_without_touching_files() {
    let data = tempdir().unwrap();
    let large = data.path().join("a/region.geojson");
    let small = data.path().join("b/region.geojson");
    sized_file(&large, 8_000_000);
    sized_file(&small, 2_000_000);

    let (stdout, stderr, success) = run_geoshrink(&[data.path().to_str().unwrap(), "--dry-run"]);

    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("Found 2 files"), "stdout: {}", stdout);
    assert!(stdout.contains("would simplify"), "stdout: {}", stdout);
    assert!(stdout.contains("skipping"), "stdout: {}", stdout);
    assert!(stdout.contains("8.00 MB"), "stdout: {}", stdout);
    assert_eq!(fs::metadata(&large).unwrap().len(), 8_000_000);
}

#[test]
fn test_report_is_written() {
    let data = tempdir().unwrap();
    sized_file(&data.path().join("br/region.geojson"), 8_000_000);
    let report = data.path().join("out/report.json");

    let (_, stderr, success) = run_geoshrink(&[
        data.path().to_str().unwrap(),
        "--dry-run",
        "--quiet",
        "--report",
        report.to_str().unwrap(),
    ]);
    assert!(success, "stderr: {}", stderr);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["totals"]["would_simplify"], 1);
    assert_eq!(json["files"][0]["outcome"]["status"], "would_simplify");
    assert_eq!(json["files"][0]["initial_bytes"], 8_000_000);
}

#[test]
fn test_empty_directory_succeeds() {
    let data = tempdir().unwrap();
    let (stdout, _, success) = run_geoshrink(&[data.path().to_str().unwrap(), "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("No matching files found"), "stdout: {}", stdout);
}

#[test]
fn test_quiet_suppresses_status_lines() {
    let data = tempdir().unwrap();
    sized_file(&data.path().join("region.geojson"), 1_000);

    let (stdout, _, success) =
        run_geoshrink(&[data.path().to_str().unwrap(), "--dry-run", "--quiet"]);
    assert!(success);
    assert!(stdout.is_empty(), "stdout: {}", stdout);
}
