//! The external simplification tool and the seam it plugs into

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::CollaboratorError;
use crate::simplify::config::{FormatDescriptor, SimplifyOptions};

/// One simplification attempt against a single file
#[derive(Debug, Clone)]
pub struct SimplifyRequest<'a> {
    pub input: &'a Path,
    /// Directory the tool writes into; the input's own directory
    pub output_dir: &'a Path,
    pub format: &'a FormatDescriptor,
    /// Options for this attempt, percentage already escalated
    pub options: SimplifyOptions,
}

/// Simplifies every layer of a vector file, overwriting its outputs in place.
pub trait Simplifier: Send + Sync {
    fn simplify(&self, request: &SimplifyRequest<'_>) -> Result<(), CollaboratorError>;
}

/// Runs the `mapshaper` command-line tool
#[derive(Debug, Clone)]
pub struct MapshaperCli {
    program: PathBuf,
}

impl Default for MapshaperCli {
    fn default() -> Self {
        Self::new("mapshaper")
    }
}

impl MapshaperCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check that the tool can be launched and return its version string
    pub fn probe(&self) -> Result<String, CollaboratorError> {
        let output = Command::new(&self.program)
            .arg("-v")
            .output()
            .map_err(|source| self.spawn_error(source))?;

        if !output.status.success() {
            return Err(CollaboratorError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Command-line arguments for one attempt
    pub fn args(request: &SimplifyRequest<'_>) -> Vec<OsString> {
        let options = &request.options;
        let mut args: Vec<OsString> = vec!["-i".into(), request.input.into()];

        args.push("-simplify".into());
        args.push(options.algorithm.as_str().into());
        args.push(format!("percentage={}", format_decimal(options.percentage)).into());
        if options.keep_shapes {
            args.push("keep-shapes".into());
        }
        if options.snap {
            args.push("-snap".into());
        }
        if options.clean {
            args.push("-clean".into());
        }

        args.push("-o".into());
        if let Some(precision) = options.precision {
            args.push(format!("precision={}", format_decimal(precision)).into());
        }
        args.push(directory_target(request.output_dir));
        args.push("target=*".into());
        args.push("force".into());
        args.push(format!("format={}", request.format.name).into());
        args.push(format!("extension={}", request.format.extension).into());
        args
    }

    fn spawn_error(&self, source: std::io::Error) -> CollaboratorError {
        CollaboratorError::Spawn {
            program: self.program().display().to_string(),
            source,
        }
    }
}

impl Simplifier for MapshaperCli {
    fn simplify(&self, request: &SimplifyRequest<'_>) -> Result<(), CollaboratorError> {
        let args = Self::args(request);
        tracing::debug!(
            program = %self.program().display(),
            args = ?args,
            "running simplifier"
        );

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| self.spawn_error(source))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CollaboratorError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// mapshaper treats a trailing separator as "write into this directory"
fn directory_target(dir: &Path) -> OsString {
    let mut target = if dir.as_os_str().is_empty() {
        OsString::from(".")
    } else {
        dir.as_os_str().to_owned()
    };
    if !target.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR) {
        target.push(std::path::MAIN_SEPARATOR_STR);
    }
    target
}

/// Shortest plain decimal that parses back to `value`; never exponent form
fn format_decimal(value: f64) -> String {
    value.to_string()
}
