//! Human-readable per-file status lines

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use crate::cli::CliUtils;
use crate::error::{CollaboratorError, GeoshrinkError};
use crate::simplify::config::SizeThreshold;

/// Writes status lines for concurrently processed files.
///
/// When a progress bar is attached, lines are printed above it so the bar
/// stays intact while several workers report at once.
#[derive(Debug, Clone)]
pub struct StatusPrinter {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl StatusPrinter {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    /// Printer that only reports errors; used by tests and `--quiet`
    pub fn silent() -> Self {
        Self::new(true)
    }

    /// Attach a progress bar when stdout is an interactive terminal
    pub fn with_progress(mut self) -> Self {
        if !self.quiet && atty::is(atty::Stream::Stdout) {
            let bar = ProgressBar::new(0);
            if let Ok(bar_style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files")
            {
                bar.set_style(bar_style.progress_chars("#>-"));
            }
            self.bar = Some(bar);
        }
        self
    }

    pub fn set_total(&self, total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_length(total as u64);
        }
    }

    pub fn file_finished(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn found(&self, count: usize, root: &Path) {
        if count == 0 {
            self.line(format!("No matching files found in {}", root.display()));
        } else {
            self.line(format!("Found {} files in {}", count, root.display()));
        }
    }

    pub fn skipped(&self, path: &Path, bytes: u64, threshold: SizeThreshold) {
        self.line(format!(
            "{} {} ({}) is already under the size limit of {}, skipping",
            style("✓").green(),
            path.display(),
            CliUtils::format_megabytes(bytes),
            threshold
        ));
    }

    pub fn would_simplify(&self, path: &Path, bytes: u64, threshold: SizeThreshold) {
        self.line(format!(
            "{} {} ({}) exceeds {}, would simplify",
            style("•").cyan(),
            path.display(),
            CliUtils::format_megabytes(bytes),
            threshold
        ));
    }

    pub fn simplifying(&self, path: &Path, bytes: u64, attempt: u32) {
        let attempt_note = if attempt > 1 {
            format!(", attempt {}", attempt)
        } else {
            String::new()
        };
        self.line(format!(
            "{} Simplifying {} ({}{})...",
            style("↻").cyan(),
            path.display(),
            CliUtils::format_megabytes(bytes),
            attempt_note
        ));
    }

    pub fn still_too_large(&self, path: &Path, bytes: u64) {
        self.line(format!(
            "{}  {} still too large ({}), needs re-run",
            style("⚠").yellow(),
            path.display(),
            CliUtils::format_megabytes(bytes)
        ));
    }

    pub fn success(&self, path: &Path, bytes: u64) {
        self.line(format!(
            "{} simplified {} to {}, which is under the limit",
            style("✓").green(),
            path.display(),
            CliUtils::format_megabytes(bytes)
        ));
    }

    pub fn exhausted(&self, path: &Path, bytes: u64, attempts: u32) {
        self.line(format!(
            "{}  giving up on {} after {} attempts, still {}",
            style("⚠").yellow(),
            path.display(),
            attempts,
            CliUtils::format_megabytes(bytes)
        ));
    }

    pub fn simplify_failed(&self, path: &Path, error: &CollaboratorError) {
        self.error_line(format!(
            "{} Error simplifying {}: {}",
            style("✗").red(),
            path.display(),
            error
        ));
    }

    pub fn file_failed(&self, path: &Path, error: &GeoshrinkError) {
        self.error_line(format!("{} {}: {}", style("✗").red(), path.display(), error));
    }

    fn line(&self, message: String) {
        if self.quiet {
            return;
        }
        match &self.bar {
            Some(bar) => bar.println(message),
            None => println!("{}", message),
        }
    }

    fn error_line(&self, message: String) {
        match &self.bar {
            Some(bar) => bar.suspend(|| eprintln!("{}", message)),
            None => eprintln!("{}", message),
        }
    }
}
