//! CLI exit codes and command failures.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map errors surfaced by commands to those exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Doctor checks never produce a non-zero exit code; only setup failures do.

use mobius_config::ConfigError;
use mobius_replicator::ReplicateError;
use std::path::PathBuf;
use thiserror::Error;

/// Structured exit codes for mobius-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - copy failure, missing or unreadable configuration, anything unclassified.
    GeneralError = 1,

    /// A prerequisite is missing: the module directory does not exist.
    ///
    /// Scripts should fix the environment rather than retry.
    MissingDependency = 2,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

/// Failures raised by the command layer itself.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("ERROR: module path not found: {}", .0.display())]
    ModuleNotFound(PathBuf),

    /// The replicator's error is rendered inline; it is not chained as a source
    /// so `{:#}` prints the reason once.
    #[error("ERROR: copy failed: {0}")]
    CopyFailed(ReplicateError),
}

impl From<&CliError> for ExitCode {
    fn from(err: &CliError) -> Self {
        match err {
            CliError::ModuleNotFound(_) => ExitCode::MissingDependency,
            CliError::CopyFailed(_) => ExitCode::GeneralError,
        }
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::MissingEnvVar(_) | ConfigError::DotenvIo { .. } => {
                ExitCode::GeneralError
            }
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if nothing in the chain is classified.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(err) = cause.downcast_ref::<CliError>() {
                return ExitCode::from(err);
            }
            if let Some(err) = cause.downcast_ref::<ConfigError>() {
                return ExitCode::from(err);
            }
        }
        ExitCode::GeneralError
    }
}
