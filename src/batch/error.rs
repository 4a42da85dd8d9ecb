use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::reconstruction::ReconstructionError;
use crate::runner::RunnerError;
use crate::scoring::ScoringError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("another batch holds the lock at {path}")]
    LockHeld { path: PathBuf },

    #[error("failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no videos to process")]
    NoVideos,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("reconstruction setup failed: {0}")]
    Reconstruction(#[from] ReconstructionError),

    #[error("scoring setup failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("run failed: {0}")]
    Runner(#[from] RunnerError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type BatchResult<T> = Result<T, BatchError>;
