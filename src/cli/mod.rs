//! Command-line interface module

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{GeoshrinkError, GeoshrinkResult};
use crate::simplify::config::{
    Algorithm, FormatDescriptor, RetryPolicy, RunConfig, SimplifyOptions, SizeThreshold,
    BYTES_PER_MB,
};

/// Main CLI arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "geoshrink")]
#[command(about = "Simplify GeoJSON/TopoJSON files in place until they fit under a size limit")]
#[command(version)]
#[command(long_about = None)]
pub struct Args {
    /// Data directory to scan recursively
    #[arg(default_value = "./data")]
    pub data_dir: PathBuf,

    /// Size limit in megabytes (1 MB = 1,000,000 bytes)
    #[arg(long, default_value_t = 6.5)]
    pub max_size_mb: f64,

    /// Formats to process, by file suffix (repeat or comma-separate)
    #[arg(long = "format", value_delimiter = ',', default_values_t = vec![FormatArg::Geojson])]
    pub formats: Vec<FormatArg>,

    /// Simplification method
    #[arg(long, default_value_t = AlgorithmArg::Visvalingam)]
    pub algorithm: AlgorithmArg,

    /// Fraction of removable vertices to retain (0.01 = 1%)
    #[arg(long, default_value_t = 0.01)]
    pub percentage: f64,

    /// Allow small polygons to disappear
    #[arg(long)]
    pub no_keep_shapes: bool,

    /// Do not snap nearly-identical vertices
    #[arg(long)]
    pub no_snap: bool,

    /// Remove degenerate geometry after simplifying
    #[arg(long)]
    pub clean: bool,

    /// Coordinate precision of the written output
    #[arg(long, default_value_t = 0.00001)]
    pub precision: f64,

    /// Write coordinates at full precision
    #[arg(long, conflicts_with = "precision")]
    pub no_precision: bool,

    /// Attempts per file before giving up (0 = until it fits)
    #[arg(long, default_value_t = 10)]
    pub max_attempts: u32,

    /// Multiply the retained percentage by this on every retry (0-1]
    #[arg(long, default_value_t = 1.0)]
    pub strength_factor: f64,

    /// Number of files to process at once (default: one per CPU)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// mapshaper executable
    #[arg(long, default_value = "mapshaper")]
    pub mapshaper: PathBuf,

    /// Write a JSON report of the run to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Only report which files are over the limit
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Formats selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// `.geojson` files
    Geojson,
    /// `.topo.json` files
    Topojson,
}

impl std::fmt::Display for FormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatArg::Geojson => write!(f, "geojson"),
            FormatArg::Topojson => write!(f, "topojson"),
        }
    }
}

impl From<FormatArg> for FormatDescriptor {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Geojson => FormatDescriptor::geojson(),
            FormatArg::Topojson => FormatDescriptor::topojson(),
        }
    }
}

/// Simplification methods for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmArg {
    #[value(name = "visvalingam")]
    Visvalingam,
    #[value(name = "dp", alias = "douglas-peucker")]
    Dp,
}

impl std::fmt::Display for AlgorithmArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(Algorithm::from(*self).as_str())
    }
}

impl From<AlgorithmArg> for Algorithm {
    fn from(algorithm: AlgorithmArg) -> Self {
        match algorithm {
            AlgorithmArg::Visvalingam => Algorithm::Visvalingam,
            AlgorithmArg::Dp => Algorithm::DouglasPeucker,
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub args: Args,
    pub run_config: RunConfig,
}

impl CliConfig {
    /// Create CLI configuration from arguments
    pub fn from_args(args: Args) -> GeoshrinkResult<Self> {
        let run_config = Self::create_run_config(&args)?;

        Ok(Self { args, run_config })
    }

    fn create_run_config(args: &Args) -> GeoshrinkResult<RunConfig> {
        let threshold =
            SizeThreshold::from_megabytes(args.max_size_mb).map_err(GeoshrinkError::configuration)?;

        let mut formats: Vec<FormatDescriptor> = Vec::new();
        for format in args.formats.iter().copied().map(FormatDescriptor::from) {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }

        let config = RunConfig {
            data_dir: args.data_dir.clone(),
            threshold,
            formats,
            options: SimplifyOptions {
                algorithm: args.algorithm.into(),
                percentage: args.percentage,
                keep_shapes: !args.no_keep_shapes,
                snap: !args.no_snap,
                clean: args.clean,
                precision: (!args.no_precision).then_some(args.precision),
            },
            retry: RetryPolicy {
                max_attempts: args.max_attempts,
                strength_factor: args.strength_factor,
            },
            jobs: args.jobs,
            dry_run: args.dry_run,
        };

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.args.quiet
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.args.verbose
    }

    /// Default tracing filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.is_verbose() {
            "geoshrink=debug"
        } else if self.is_quiet() {
            "error"
        } else {
            "warn"
        }
    }
}

/// CLI utilities and helpers
pub struct CliUtils;

impl CliUtils {
    /// Format a file size in decimal megabytes, the unit the limit is given in
    pub fn format_megabytes(bytes: u64) -> String {
        format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
    }

    /// Format a duration in human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_millis = duration.as_millis();

        if total_millis < 1000 {
            format!("{}ms", total_millis)
        } else if total_millis < 60_000 {
            format!("{:.1}s", total_millis as f64 / 1000.0)
        } else {
            let minutes = total_millis / 60_000;
            let seconds = (total_millis % 60_000) / 1000;
            format!("{}m {}s", minutes, seconds)
        }
    }

    /// Show an error message
    pub fn show_error(message: &str) {
        eprintln!("{} {}", console::style("✗").red(), message);
    }
}

/// Handle CLI errors with user-friendly messages
pub fn handle_error(error: &GeoshrinkError) {
    CliUtils::show_error(&error.to_string());

    if let Some(hint) = error.hint() {
        eprintln!("\nTip: {}", hint);
    }
}
