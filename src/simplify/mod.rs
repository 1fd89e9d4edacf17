//! Size-bounded simplification of vector files
//!
//! A file over the size threshold is handed to an external simplifier, then
//! re-measured, until it fits or its attempt budget is spent. Files are
//! processed concurrently and the run waits for every one of them.

pub mod batch;
pub mod collaborator;
pub mod config;
pub mod engine;
pub mod stats;
pub mod status;

pub use batch::run;
pub use collaborator::{MapshaperCli, Simplifier, SimplifyRequest};
pub use config::{
    Algorithm, FormatDescriptor, RetryPolicy, RunConfig, SimplifyOptions, SizeThreshold,
};
pub use engine::{file_size, FileOutcome, Outcome, SizeBoundedSimplifier};
pub use stats::{FileReport, RunSummary, Totals};
pub use status::StatusPrinter;
