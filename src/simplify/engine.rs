//! Per-file measure/simplify/re-measure loop

use serde::Serialize;
use std::path::Path;

use crate::error::{GeoshrinkError, GeoshrinkResult};
use crate::simplify::collaborator::{SimplifyRequest, Simplifier};
use crate::simplify::config::{FormatDescriptor, RunConfig, SimplifyOptions};
use crate::simplify::status::StatusPrinter;

/// Terminal state of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Already under the threshold; never handed to the simplifier
    Skipped { bytes: u64 },
    /// Over the threshold, but the run was a dry run
    WouldSimplify { bytes: u64 },
    /// Brought under the threshold
    Done { bytes: u64, attempts: u32 },
    /// Attempt budget spent while still over the threshold
    Exhausted { bytes: u64, attempts: u32 },
}

impl Outcome {
    /// Size of the file when it reached this state
    pub fn bytes(&self) -> u64 {
        match *self {
            Outcome::Skipped { bytes }
            | Outcome::WouldSimplify { bytes }
            | Outcome::Done { bytes, .. }
            | Outcome::Exhausted { bytes, .. } => bytes,
        }
    }

    pub fn attempts(&self) -> u32 {
        match *self {
            Outcome::Skipped { .. } | Outcome::WouldSimplify { .. } => 0,
            Outcome::Done { attempts, .. } | Outcome::Exhausted { attempts, .. } => attempts,
        }
    }
}

/// Outcome of a file together with the size it started at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOutcome {
    pub initial_bytes: u64,
    pub outcome: Outcome,
}

/// Current size of `path` in bytes. Never cached.
pub fn file_size(path: &Path) -> GeoshrinkResult<u64> {
    std::fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|e| GeoshrinkError::measure(path.to_path_buf(), e))
}

/// Drives one file under the configured threshold
pub struct SizeBoundedSimplifier<'a> {
    config: &'a RunConfig,
    simplifier: &'a dyn Simplifier,
    status: &'a StatusPrinter,
}

impl<'a> SizeBoundedSimplifier<'a> {
    pub fn new(
        config: &'a RunConfig,
        simplifier: &'a dyn Simplifier,
        status: &'a StatusPrinter,
    ) -> Self {
        Self {
            config,
            simplifier,
            status,
        }
    }

    /// Simplify `path` in place until it is under the threshold or the retry
    /// budget runs out.
    ///
    /// Simplifier failures are reported and swallowed; the file is re-measured
    /// as usual and the attempt counts against the budget. Failing to measure
    /// the file is an error.
    pub fn process(&self, path: &Path, format: &FormatDescriptor) -> GeoshrinkResult<FileOutcome> {
        let threshold = self.config.threshold;
        let initial_bytes = file_size(path)?;

        if !threshold.is_exceeded_by(initial_bytes) {
            self.status.skipped(path, initial_bytes, threshold);
            return Ok(FileOutcome {
                initial_bytes,
                outcome: Outcome::Skipped {
                    bytes: initial_bytes,
                },
            });
        }

        if self.config.dry_run {
            self.status.would_simplify(path, initial_bytes, threshold);
            return Ok(FileOutcome {
                initial_bytes,
                outcome: Outcome::WouldSimplify {
                    bytes: initial_bytes,
                },
            });
        }

        let output_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let retry = self.config.retry;
        let mut bytes = initial_bytes;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let options = SimplifyOptions {
                percentage: retry.percentage_for_attempt(self.config.options.percentage, attempts),
                ..self.config.options.clone()
            };
            self.status.simplifying(path, bytes, attempts);
            tracing::info!(
                path = %path.display(),
                attempt = attempts,
                percentage = options.percentage,
                "simplifying"
            );

            let request = SimplifyRequest {
                input: path,
                output_dir,
                format,
                options,
            };
            if let Err(e) = self.simplifier.simplify(&request) {
                self.status.simplify_failed(path, &e);
            }

            bytes = file_size(path)?;
            if !threshold.is_exceeded_by(bytes) {
                self.status.success(path, bytes);
                return Ok(FileOutcome {
                    initial_bytes,
                    outcome: Outcome::Done { bytes, attempts },
                });
            }

            self.status.still_too_large(path, bytes);
            if !retry.allows(attempts) {
                self.status.exhausted(path, bytes, attempts);
                return Ok(FileOutcome {
                    initial_bytes,
                    outcome: Outcome::Exhausted { bytes, attempts },
                });
            }
        }
    }
}
