//! Run summary and JSON report

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GeoshrinkError, GeoshrinkResult};
use crate::simplify::config::{FormatDescriptor, RunConfig};
use crate::simplify::engine::{FileOutcome, Outcome};

/// Result of processing one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub format: String,
    pub initial_bytes: Option<u64>,
    pub outcome: Option<Outcome>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl FileReport {
    pub fn new(
        path: &Path,
        format: &FormatDescriptor,
        result: &GeoshrinkResult<FileOutcome>,
        elapsed: Duration,
    ) -> Self {
        let (initial_bytes, outcome, error) = match result {
            Ok(file) => (Some(file.initial_bytes), Some(file.outcome), None),
            Err(e) => (None, None, Some(e.to_string())),
        };
        Self {
            path: path.to_path_buf(),
            format: format.name.clone(),
            initial_bytes,
            outcome,
            error,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Per-state file counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub found: usize,
    pub skipped: usize,
    pub simplified: usize,
    pub exhausted: usize,
    pub would_simplify: usize,
    pub failed: usize,
}

impl Totals {
    fn from_files(files: &[FileReport]) -> Self {
        let mut totals = Totals {
            found: files.len(),
            ..Default::default()
        };
        for file in files {
            match file.outcome {
                Some(Outcome::Skipped { .. }) => totals.skipped += 1,
                Some(Outcome::Done { .. }) => totals.simplified += 1,
                Some(Outcome::Exhausted { .. }) => totals.exhausted += 1,
                Some(Outcome::WouldSimplify { .. }) => totals.would_simplify += 1,
                None => totals.failed += 1,
            }
        }
        totals
    }
}

/// Everything that happened during one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub data_dir: PathBuf,
    pub threshold_mb: f64,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub totals: Totals,
    pub files: Vec<FileReport>,
}

impl RunSummary {
    pub fn new(config: &RunConfig, started_at: DateTime<Utc>, files: Vec<FileReport>) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            threshold_mb: config.threshold.megabytes(),
            dry_run: config.dry_run,
            started_at,
            finished_at: Utc::now(),
            totals: Totals::from_files(&files),
            files,
        }
    }

    /// True if any file could not be measured
    pub fn has_failures(&self) -> bool {
        self.totals.failed > 0
    }

    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// One-line summary for the console
    pub fn summary(&self) -> String {
        let t = &self.totals;
        let mut line = format!(
            "{} files: {} simplified, {} skipped",
            t.found, t.simplified, t.skipped
        );
        if t.would_simplify > 0 {
            line.push_str(&format!(", {} would be simplified", t.would_simplify));
        }
        if t.exhausted > 0 {
            line.push_str(&format!(", {} still too large", t.exhausted));
        }
        if t.failed > 0 {
            line.push_str(&format!(", {} failed", t.failed));
        }
        line
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the summary as pretty JSON, creating parent directories
    pub fn write_json(&self, path: &Path) -> GeoshrinkResult<()> {
        let report_error = |message: String| GeoshrinkError::Report {
            path: path.to_path_buf(),
            message,
        };

        let json = self.to_json().map_err(|e| report_error(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| report_error(e.to_string()))?;
        }
        std::fs::write(path, json).map_err(|e| report_error(e.to_string()))
    }
}
