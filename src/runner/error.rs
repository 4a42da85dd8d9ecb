use thiserror::Error;

use crate::reconstruction::ReconstructionError;
use crate::sequence::SequenceError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum RunnerError {
    /// Reconstructed indices differ from the mask with no diagnostics to
    /// explain it. The reconstruction stage broke its contract.
    #[error("video {video_id}: reconstructed indices {found:?} do not match masked indices {expected:?}")]
    MaskMismatch {
        video_id: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("sequence error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("reconstruction error: {0}")]
    Reconstruction(#[from] ReconstructionError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type RunnerResult<T> = Result<T, RunnerError>;
