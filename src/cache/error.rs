use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors returned by the persistent response cache.
pub enum CacheError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored entry carries a different key than its file name.
    #[error("cache entry at {path} does not match its key")]
    KeyMismatch {
        /// Entry file.
        path: PathBuf,
    },

    /// Failed to create the cache directory.
    #[error("cache directory unavailable: {path}")]
    DirectoryUnavailable {
        /// Directory path.
        path: PathBuf,
    },
}

/// Convenience result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
