use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    #[error("candidate/reference length mismatch: {candidates} candidates, {references} references")]
    LengthMismatch {
        candidates: usize,
        references: usize,
    },

    #[error("unknown scoring model: {0}")]
    UnknownModel(String),

    #[error("scoring computation failed: {reason}")]
    ComputationFailed { reason: String },
}

pub type ScoringResult<T> = Result<T, ScoringError>;
