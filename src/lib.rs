//! geoshrink
//!
//! Walks a data directory for vector files (GeoJSON, TopoJSON) and shrinks
//! every file over a size limit by repeatedly running mapshaper's
//! simplification over it in place.

pub mod cli;
pub mod error;
pub mod locator;
pub mod simplify;

// Re-export commonly used types
pub use error::{CollaboratorError, GeoshrinkError, GeoshrinkResult};
pub use locator::find_files_by_suffix;
pub use simplify::{
    run, FormatDescriptor, MapshaperCli, Outcome, RetryPolicy, RunConfig, RunSummary,
    SimplifyOptions, SimplifyRequest, Simplifier, SizeThreshold, StatusPrinter,
};
