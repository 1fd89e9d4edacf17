//! Integration tests for a full run over a data directory
//!
//! A fake simplifier stands in for mapshaper: it shrinks files by
//! truncating them, which is all the run loop can observe anyway.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use assert_matches::assert_matches;
use geoshrink::{
    run, CollaboratorError, FormatDescriptor, GeoshrinkError, Outcome, RetryPolicy, RunConfig,
    SimplifyRequest, Simplifier, SizeThreshold, StatusPrinter,
};
use tempfile::tempdir;

/// Shrinks each file to `ratio` of its size per call
struct Shrinking {
    ratio: f64,
    calls: Mutex<HashMap<PathBuf, u32>>,
}

impl Shrinking {
    fn new(ratio: f64) -> Self {
        Self {
            ratio,
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn calls_for(&self, path: &Path) -> u32 {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }
}

impl Simplifier for Shrinking {
    fn simplify(&self, request: &SimplifyRequest<'_>) -> Result<(), CollaboratorError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(request.input.to_path_buf())
            .or_insert(0) += 1;

        let file = fs::OpenOptions::new()
            .write(true)
            .open(request.input)
            .map_err(|e| CollaboratorError::other(e.to_string()))?;
        let len = file.metadata().unwrap().len();
        file.set_len((len as f64 * self.ratio) as u64).unwrap();
        Ok(())
    }
}

/// Fails every call without touching the file
struct Broken {
    calls: Mutex<u32>,
}

impl Simplifier for Broken {
    fn simplify(&self, _request: &SimplifyRequest<'_>) -> Result<(), CollaboratorError> {
        *self.calls.lock().unwrap() += 1;
        Err(CollaboratorError::other("Unable to parse input file"))
    }
}

/// Deletes the file instead of simplifying it
struct Deleting;

impl Simplifier for Deleting {
    fn simplify(&self, request: &SimplifyRequest<'_>) -> Result<(), CollaboratorError> {
        fs::remove_file(request.input).unwrap();
        Ok(())
    }
}

fn sized_file(path: &Path, bytes: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().set_len(bytes).unwrap();
}

fn config(root: &Path) -> RunConfig {
    RunConfig::new(root).with_threshold(SizeThreshold::from_megabytes(6.5).unwrap())
}

#[test]
fn test_large_file_simplified_small_file_skipped() {
    let data = tempdir().unwrap();
    let large = data.path().join("a/region.geojson");
    let small = data.path().join("b/region.geojson");
    sized_file(&large, 8_000_000);
    sized_file(&small, 2_000_000);

    let simplifier = Shrinking::new(0.9);
    let summary = run(&config(data.path()), &simplifier, &StatusPrinter::silent()).unwrap();

    assert_eq!(summary.totals.found, 2);
    assert_eq!(summary.totals.simplified, 1);
    assert_eq!(summary.totals.skipped, 1);
    assert!(!summary.has_failures());

    // 8.0 -> 7.2 -> 6.48
    assert_eq!(simplifier.calls_for(&large), 2);
    assert_eq!(simplifier.calls_for(&small), 0);
    assert!(fs::metadata(&large).unwrap().len() < 6_500_000);
    assert_eq!(fs::metadata(&small).unwrap().len(), 2_000_000);

    let large_report = summary.files.iter().find(|f| f.path == large).unwrap();
    assert_eq!(large_report.initial_bytes, Some(8_000_000));
    assert_matches!(
        large_report.outcome,
        Some(Outcome::Done { attempts: 2, bytes }) if bytes < 6_500_000
    );
}

#[test]
fn test_second_run_makes_no_calls() {
    let data = tempdir().unwrap();
    sized_file(&data.path().join("x/region.geojson"), 9_000_000);

    let simplifier = Shrinking::new(0.5);
    run(&config(data.path()), &simplifier, &StatusPrinter::silent()).unwrap();
    assert_eq!(simplifier.total_calls(), 1);

    let again = Shrinking::new(0.5);
    let summary = run(&config(data.path()), &again, &StatusPrinter::silent()).unwrap();
    assert_eq!(again.total_calls(), 0);
    assert_eq!(summary.totals.skipped, 1);
}

#[test]
fn test_collaborator_failure_is_retried_not_fatal() {
    let data = tempdir().unwrap();
    let path = data.path().join("region.geojson");
    sized_file(&path, 7_000_000);

    let broken = Broken {
        calls: Mutex::new(0),
    };
    let retry = RetryPolicy {
        max_attempts: 3,
        strength_factor: 1.0,
    };
    let summary = run(
        &config(data.path()).with_retry(retry),
        &broken,
        &StatusPrinter::silent(),
    )
    .unwrap();

    assert_eq!(*broken.calls.lock().unwrap(), 3);
    assert_eq!(summary.totals.exhausted, 1);
    assert_eq!(
        summary.files[0].outcome,
        Some(Outcome::Exhausted {
            bytes: 7_000_000,
            attempts: 3
        })
    );
    assert!(!summary.has_failures());
}

#[test]
fn test_measure_failure_does_not_stop_other_files() {
    let data = tempdir().unwrap();
    let doomed = data.path().join("gone/region.geojson");
    let fine = data.path().join("kept/region.geojson");
    sized_file(&doomed, 7_000_000);
    sized_file(&fine, 1_000);

    let summary = run(&config(data.path()), &Deleting, &StatusPrinter::silent()).unwrap();

    assert!(summary.has_failures());
    assert_eq!(summary.totals.failed, 1);
    assert_eq!(summary.totals.skipped, 1);
    let failed = summary.files.iter().find(|f| f.path == doomed).unwrap();
    assert!(failed.error.as_deref().unwrap().contains("failed to measure"));
}

#[test]
fn test_many_files_all_reach_terminal_state() {
    let data = tempdir().unwrap();
    for i in 0..24u64 {
        let path = data
            .path()
            .join(format!("c{}", i % 5))
            .join(format!("r{}.geojson", i));
        sized_file(&path, 7_000_000 + i * 10_000);
    }

    let simplifier = Shrinking::new(0.8);
    let summary = run(
        &config(data.path()).with_jobs(4),
        &simplifier,
        &StatusPrinter::silent(),
    )
    .unwrap();

    assert_eq!(summary.totals.found, 24);
    assert_eq!(summary.totals.simplified, 24);
    assert_eq!(simplifier.total_calls(), 24);
    for file in &summary.files {
        assert!(fs::metadata(&file.path).unwrap().len() < 6_500_000);
    }
}

#[test]
fn test_topojson_format_uses_its_own_suffix() {
    let data = tempdir().unwrap();
    let topo = data.path().join("br/municipality.topo.json");
    let geo = data.path().join("br/municipality.geojson");
    sized_file(&topo, 7_000_000);
    sized_file(&geo, 7_000_000);

    let simplifier = Shrinking::new(0.5);
    let config = config(data.path()).with_formats(vec![FormatDescriptor::topojson()]);
    let summary = run(&config, &simplifier, &StatusPrinter::silent()).unwrap();

    assert_eq!(summary.totals.found, 1);
    assert_eq!(simplifier.calls_for(&topo), 1);
    assert_eq!(simplifier.calls_for(&geo), 0);
    assert_eq!(summary.files[0].format, "topojson");
}

#[test]
fn test_missing_data_dir_aborts() {
    let data = tempdir().unwrap();
    let missing = data.path().join("data");

    let result = run(&config(&missing), &Shrinking::new(0.5), &StatusPrinter::silent());
    assert_matches!(result, Err(GeoshrinkError::NotFound { .. }));
}

#[cfg(unix)]
#[test]
fn test_traversal_error_aborts_before_simplifying() {
    let data = tempdir().unwrap();
    let big = data.path().join("a/r.geojson");
    sized_file(&big, 8_000_000);
    std::os::unix::fs::symlink(data.path(), data.path().join("a/loop")).unwrap();

    let simplifier = Shrinking::new(0.5);
    let result = run(&config(data.path()), &simplifier, &StatusPrinter::silent());

    assert_matches!(result, Err(GeoshrinkError::Traversal { .. }));
    assert_eq!(simplifier.total_calls(), 0);
    assert_eq!(fs::metadata(&big).unwrap().len(), 8_000_000);
}
