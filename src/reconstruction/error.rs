use std::path::PathBuf;

use thiserror::Error;

/// Configuration and programming errors of a reconstruction strategy.
///
/// Oracle and parse failures are not errors here; they are captured in the
/// result's debug data.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("strategy '{strategy}' needs an oracle client but none was provided")]
    MissingOracle { strategy: String },

    #[error("strategy '{strategy}' sets both instruction and instruction_path")]
    InstructionConflict { strategy: String },

    #[error("failed to read instruction file {path}: {source}")]
    InstructionUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("strategy '{strategy}' has an empty model name")]
    EmptyModel { strategy: String },

    #[error("failed to serialize prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

pub type ReconstructionResult<T> = Result<T, ReconstructionError>;

/// Why an oracle response could not be read as a clip list.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("response is empty")]
    Empty,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("unexpected response shape: expected {expected}")]
    UnexpectedShape { expected: &'static str },

    #[error("invalid clip entry at position {position}: {reason}")]
    InvalidEntry { position: usize, reason: String },
}
