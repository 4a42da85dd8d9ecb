//! Semantic-similarity scoring.
//!
//! The evaluator only sees the [`SimilarityScorer`] trait. The built-in
//! [`TokenOverlapScorer`] is a lexical stand-in for a learned metric, with
//! optional corpus-fitted IDF weights.

pub mod error;
pub mod idf;
pub mod scorer;
pub mod types;


pub use error::{ScoringError, ScoringResult};
pub use idf::IdfTable;
pub use scorer::{SimilarityScorer, TOKEN_OVERLAP_MODEL, TokenOverlapScorer, scorer_for};
pub use types::{Metrics, PairScore, round_to};

/// Lowercase alphanumeric word tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}
