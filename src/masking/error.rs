use thiserror::Error;

/// Errors raised while building masking strategies from a sweep.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaskingError {
    #[error("masking ratio {ratio} must be within [0, 1]")]
    InvalidRatio { ratio: f64 },

    #[error(
        "invalid partition: {num_parts_to_mask} block(s) from {start_partition} of {num_partitions}"
    )]
    InvalidPartition {
        num_partitions: usize,
        start_partition: usize,
        num_parts_to_mask: usize,
    },

    #[error("invalid sweep range {start}..{end} step {step}")]
    InvalidRange { start: u64, end: u64, step: u64 },

    #[error("sweep for scheme '{scheme}' expands to no strategies")]
    EmptySweep { scheme: &'static str },
}

pub type MaskingResult<T> = Result<T, MaskingError>;
