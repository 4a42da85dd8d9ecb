use thiserror::Error;

use crate::scoring::ScoringError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("reconstructed index {index} has no matching original clip (found {found:?})")]
    IndexMismatch { index: usize, found: Option<usize> },

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}

pub type EvaluationResult<T> = Result<T, EvaluationError>;
