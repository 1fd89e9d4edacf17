//! Configuration for a size-bounded simplification run

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::error::{GeoshrinkError, GeoshrinkResult};

/// Sizes are reported in decimal megabytes.
pub const BYTES_PER_MB: f64 = 1_000_000.0;

/// Lowest retained percentage a retry may escalate to (0.01%).
pub const MIN_PERCENTAGE: f64 = 0.0001;

/// Maximum file size, in megabytes, a file may have to be left alone
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SizeThreshold(f64);

impl SizeThreshold {
    pub fn from_megabytes(megabytes: f64) -> Result<Self, String> {
        if !megabytes.is_finite() || megabytes <= 0.0 {
            return Err(format!(
                "Size threshold must be a positive number of megabytes, got {}",
                megabytes
            ));
        }
        Ok(Self(megabytes))
    }

    pub fn megabytes(&self) -> f64 {
        self.0
    }

    /// True when a file of `bytes` must be simplified. A file exactly at the
    /// threshold counts as too large.
    pub fn is_exceeded_by(&self, bytes: u64) -> bool {
        bytes as f64 / BYTES_PER_MB >= self.0
    }
}

impl Default for SizeThreshold {
    fn default() -> Self {
        Self(6.5)
    }
}

impl fmt::Display for SizeThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MB", self.0)
    }
}

/// Output format handed to the simplifier, and the file suffix it owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    /// Format name understood by mapshaper (`format=`)
    pub name: String,
    /// Output extension, also used as the search suffix
    pub extension: String,
}

impl FormatDescriptor {
    pub fn new(name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
        }
    }

    pub fn geojson() -> Self {
        Self::new("geojson", ".geojson")
    }

    pub fn topojson() -> Self {
        Self::new("topojson", ".topo.json")
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.extension)
    }
}

/// Simplification method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Visvalingam effective-area simplification
    Visvalingam,
    /// Ramer-Douglas-Peucker
    DouglasPeucker,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Visvalingam => "visvalingam",
            Algorithm::DouglasPeucker => "dp",
        }
    }
}

/// Options passed through to every simplification attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplifyOptions {
    pub algorithm: Algorithm,
    /// Share of removable vertices to retain, as a fraction (0.01 = 1%)
    pub percentage: f64,
    /// Prevent small polygons from collapsing away
    pub keep_shapes: bool,
    /// Snap together nearly-identical vertices before simplifying
    pub snap: bool,
    /// Remove degenerate geometry after simplifying
    pub clean: bool,
    /// Coordinate precision of the written output
    pub precision: Option<f64>,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Visvalingam,
            percentage: 0.01,
            keep_shapes: true,
            snap: true,
            clean: false,
            precision: Some(0.00001),
        }
    }
}

/// How many attempts a file gets and how each retry escalates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetryPolicy {
    /// Attempt budget per file; 0 retries until the file fits
    pub max_attempts: u32,
    /// Multiplier applied to the retained percentage on every retry
    pub strength_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            strength_factor: 1.0,
        }
    }
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Whether another attempt may run after `attempts_made` attempts
    pub fn allows(&self, attempts_made: u32) -> bool {
        self.max_attempts == 0 || attempts_made < self.max_attempts
    }

    /// Retained percentage for the 1-based `attempt`
    pub fn percentage_for_attempt(&self, base: f64, attempt: u32) -> f64 {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        (base * self.strength_factor.powi(exponent)).max(MIN_PERCENTAGE)
    }
}

/// Everything a run needs, built once and shared read-only by all workers
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root of the data tree to scan
    pub data_dir: PathBuf,
    pub threshold: SizeThreshold,
    /// Formats to process; each contributes its extension as a search suffix
    pub formats: Vec<FormatDescriptor>,
    pub options: SimplifyOptions,
    pub retry: RetryPolicy,
    /// Worker threads; `None` lets rayon decide
    pub jobs: Option<usize>,
    /// Measure only, never invoke the simplifier
    pub dry_run: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            threshold: SizeThreshold::default(),
            formats: vec![FormatDescriptor::geojson()],
            options: SimplifyOptions::default(),
            retry: RetryPolicy::default(),
            jobs: None,
            dry_run: false,
        }
    }
}

impl RunConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, threshold: SizeThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_formats(mut self, formats: Vec<FormatDescriptor>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_options(mut self, options: SimplifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check configuration values before any file is touched
    pub fn validate(&self) -> GeoshrinkResult<()> {
        if self.formats.is_empty() {
            return Err(GeoshrinkError::configuration("at least one format is required"));
        }
        if let Some(format) = self.formats.iter().find(|f| f.extension.is_empty() || f.name.is_empty()) {
            return Err(GeoshrinkError::configuration(format!(
                "format '{}' needs both a name and an extension",
                format
            )));
        }

        let percentage = self.options.percentage;
        if !(percentage.is_finite() && (MIN_PERCENTAGE..=1.0).contains(&percentage)) {
            return Err(GeoshrinkError::configuration(format!(
                "percentage must be between {} and 1, got {}",
                MIN_PERCENTAGE, percentage
            )));
        }

        if let Some(precision) = self.options.precision {
            if !precision.is_finite() || precision <= 0.0 {
                return Err(GeoshrinkError::configuration(format!(
                    "precision must be positive, got {}",
                    precision
                )));
            }
        }

        let factor = self.retry.strength_factor;
        if !factor.is_finite() || factor <= 0.0 || factor > 1.0 {
            return Err(GeoshrinkError::configuration(format!(
                "strength factor must be in (0, 1], got {}",
                factor
            )));
        }

        if self.jobs == Some(0) {
            return Err(GeoshrinkError::configuration("jobs must be at least 1"));
        }

        Ok(())
    }
}
