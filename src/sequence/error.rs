//! Sequence model error types.

use thiserror::Error;

/// Errors raised while constructing or transforming a [`Video`](super::Video).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SequenceError {
    /// A clip's stored index does not match its position in the sequence.
    #[error("clip at position {position} carries index {found}")]
    IndexMismatch {
        /// Position in the clip list.
        position: usize,
        /// Index stored on the clip.
        found: usize,
    },

    /// Start or duration is negative or not finite.
    #[error("invalid time range (start={start}, duration={duration})")]
    InvalidTimeRange { start: f64, duration: f64 },

    /// A mask index points past the end of the sequence.
    #[error("mask index {index} out of range for {len} clips")]
    MaskIndexOutOfRange { index: usize, len: usize },
}

/// Convenience result type for sequence operations.
pub type SequenceResult<T> = Result<T, SequenceError>;
