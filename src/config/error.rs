//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::masking::MaskingError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Numeric environment variable could not be parsed.
    #[error("failed to parse {name}='{value}': {source}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Value parsed but is outside the accepted range.
    #[error("invalid {name}='{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("failed to read batch spec {path}: {source}")]
    ReadBatch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse batch spec {path}: {source}")]
    ParseBatch {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required list in the batch spec is empty.
    #[error("batch spec field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("duplicate strategy name '{0}' in batch spec")]
    DuplicateStrategy(String),

    /// Two runs would write the same artifact file.
    #[error("run '{run_name}' collides with another run on artifact file '{file}'")]
    DuplicateRun { run_name: String, file: String },

    #[error("invalid masking spec: {0}")]
    Masking(#[from] MaskingError),
}
