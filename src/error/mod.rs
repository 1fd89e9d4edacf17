//! Error types for locating and simplifying vector files

use std::path::PathBuf;
use std::process::ExitStatus;

/// Failures raised by the external simplification tool.
///
/// These are recovered locally by the simplifier: logged, then the file is
/// re-measured as if the attempt had produced no change.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("simplification exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("simplification failed: {message}")]
    Other { message: String },
}

impl CollaboratorError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Main error type for a geoshrink run
#[derive(Debug, thiserror::Error)]
pub enum GeoshrinkError {
    #[error("data directory not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("failed to traverse {}: {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to measure {}: {source}", path.display())]
    Measure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    #[error("failed to write report {}: {message}", path.display())]
    Report { path: PathBuf, message: String },

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl GeoshrinkError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn traversal(path: PathBuf, source: walkdir::Error) -> Self {
        Self::Traversal { path, source }
    }

    pub fn measure(path: PathBuf, source: std::io::Error) -> Self {
        Self::Measure { path, source }
    }

    /// Short hint shown under the error on the console, if one applies
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } | Self::NotADirectory { .. } => {
                Some("Pass the data directory as the first argument (default: ./data)")
            }
            Self::Configuration { .. } => Some("Run 'geoshrink --help' to see accepted values"),
            Self::Collaborator(CollaboratorError::Spawn { .. }) => {
                Some("Install mapshaper (npm install -g mapshaper) or point --mapshaper at it")
            }
            _ => None,
        }
    }
}

/// Result type for geoshrink operations
pub type GeoshrinkResult<T> = Result<T, GeoshrinkError>;
