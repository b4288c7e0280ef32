//! Error types for configuration loading.
//!
//! Invariants:
//! - Errors carry variable names and paths, never values or `.env` line contents.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required env var: {0}")]
    MissingEnvVar(String),

    /// A `.env` file exists but could not be opened or read.
    #[error("Failed to read .env file at {path}: {kind}")]
    DotenvIo { path: PathBuf, kind: ErrorKind },
}

impl ConfigError {
    /// True when the error is a required variable that is not set.
    pub fn is_missing_var(&self) -> bool {
        matches!(self, Self::MissingEnvVar(_))
    }
}
