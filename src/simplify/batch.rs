use chrono::Utc;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use crate::error::{GeoshrinkError, GeoshrinkResult};
use crate::locator;
use crate::simplify::collaborator::Simplifier;
use crate::simplify::config::{FormatDescriptor, RunConfig};
use crate::simplify::engine::SizeBoundedSimplifier;
use crate::simplify::stats::{FileReport, RunSummary};
use crate::simplify::status::StatusPrinter;

/// Locate every file for the configured formats, simplify each one on a
/// worker pool, and wait for all of them to finish.
///
/// Traversal errors abort before any file is touched. A file that cannot be
/// measured is recorded as failed without stopping the others.
pub fn run(
    config: &RunConfig,
    simplifier: &dyn Simplifier,
    status: &StatusPrinter,
) -> GeoshrinkResult<RunSummary> {
    config.validate()?;
    let started_at = Utc::now();

    let work = locate_all(config)?;
    status.found(work.len(), &config.data_dir);
    status.set_total(work.len());

    let engine = SizeBoundedSimplifier::new(config, simplifier, status);
    let process_all = || {
        work.par_iter()
            .map(|(path, format)| {
                let start = Instant::now();
                let result = engine.process(path, format);
                if let Err(e) = &result {
                    status.file_failed(path, e);
                }
                status.file_finished();
                FileReport::new(path, format, &result, start.elapsed())
            })
            .collect::<Vec<_>>()
    };

    let files = match config.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| GeoshrinkError::configuration(format!("failed to start workers: {}", e)))?
            .install(process_all),
        None => process_all(),
    };
    status.finish();

    Ok(RunSummary::new(config, started_at, files))
}

/// Files for all formats, in locate order. A file reached through more than
/// one path (symlinked directories) or matched by more than one format is
/// kept once, under the first, so no two workers rewrite the same file.
fn locate_all(config: &RunConfig) -> GeoshrinkResult<Vec<(PathBuf, &FormatDescriptor)>> {
    let mut seen = HashSet::new();
    let mut work = Vec::new();

    for format in &config.formats {
        for path in locator::find_files_by_suffix(&config.data_dir, &format.extension)? {
            let identity = std::fs::canonicalize(&path)
                .map_err(|e| GeoshrinkError::measure(path.clone(), e))?;
            if seen.insert(identity) {
                work.push((path, format));
            } else {
                tracing::debug!(path = %path.display(), "already queued through another path");
            }
        }
    }

    Ok(work)
}
