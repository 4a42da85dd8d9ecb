use std::path::PathBuf;

use thiserror::Error;

use crate::sequence::SequenceError;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("video {video_id} clip {position}: {source}")]
    InvalidClip {
        video_id: String,
        position: usize,
        #[source]
        source: SequenceError,
    },

    #[error("duplicate video id: {0}")]
    DuplicateVideo(String),
}

pub type DatasetResult<T> = Result<T, DatasetError>;
