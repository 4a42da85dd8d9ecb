use std::collections::HashMap;

use tracing::debug;

use super::error::{ScoringError, ScoringResult};
use super::idf::IdfTable;
use super::tokenize;
use super::types::{Metrics, PairScore};

/// Model identity of the built-in scorer.
pub const TOKEN_OVERLAP_MODEL: &str = "token-overlap";

/// Scoring oracle: parallel candidate/reference lists in, per-pair
/// precision/recall/F1 out.
pub trait SimilarityScorer: Send + Sync {
    fn model(&self) -> &str;

    fn score(&self, candidates: &[String], references: &[String]) -> ScoringResult<Metrics>;
}

/// Bag-of-words overlap scorer with optional IDF weighting.
///
/// Tokens are lowercase alphanumeric runs. A candidate token matches at most
/// one reference token of the same text.
#[derive(Debug, Clone, Default)]
pub struct TokenOverlapScorer {
    idf: Option<IdfTable>,
}

impl TokenOverlapScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idf(idf: IdfTable) -> Self {
        Self { idf: Some(idf) }
    }

    pub fn idf(&self) -> Option<&IdfTable> {
        self.idf.as_ref()
    }

    fn weight(&self, token: &str) -> f64 {
        match &self.idf {
            Some(idf) => idf.weight(token),
            None => 1.0,
        }
    }

    pub fn score_pair(&self, candidate: &str, reference: &str) -> PairScore {
        let candidate_counts = counts(candidate);
        let reference_counts = counts(reference);

        let total = |bag: &HashMap<String, usize>| -> f64 {
            bag.iter()
                .map(|(token, n)| self.weight(token) * *n as f64)
                .sum()
        };
        let candidate_total = total(&candidate_counts);
        let reference_total = total(&reference_counts);

        let matched: f64 = candidate_counts
            .iter()
            .filter_map(|(token, n)| {
                reference_counts
                    .get(token)
                    .map(|m| self.weight(token) * (*n).min(*m) as f64)
            })
            .sum();

        if candidate_total <= 0.0 || reference_total <= 0.0 {
            return PairScore::ZERO;
        }

        PairScore::from_precision_recall(matched / candidate_total, matched / reference_total)
    }
}

fn counts(text: &str) -> HashMap<String, usize> {
    let mut bag = HashMap::new();
    for token in tokenize(text) {
        *bag.entry(token).or_default() += 1;
    }
    bag
}

impl SimilarityScorer for TokenOverlapScorer {
    fn model(&self) -> &str {
        TOKEN_OVERLAP_MODEL
    }

    fn score(&self, candidates: &[String], references: &[String]) -> ScoringResult<Metrics> {
        if candidates.len() != references.len() {
            return Err(ScoringError::LengthMismatch {
                candidates: candidates.len(),
                references: references.len(),
            });
        }

        let mut metrics = Metrics::with_capacity(candidates.len());
        for (candidate, reference) in candidates.iter().zip(references) {
            metrics.push(self.score_pair(candidate, reference));
        }

        debug!(
            pairs = metrics.len(),
            idf = self.idf.is_some(),
            "Scored candidate/reference pairs"
        );
        Ok(metrics)
    }
}

/// Builds the scorer named by `model`, fitting IDF over `corpus` when asked.
pub fn scorer_for<I, S>(model: &str, idf: bool, corpus: I) -> ScoringResult<Box<dyn SimilarityScorer>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match model {
        TOKEN_OVERLAP_MODEL | "token_overlap" => {
            let scorer = if idf {
                TokenOverlapScorer::with_idf(IdfTable::fit(corpus))
            } else {
                TokenOverlapScorer::new()
            };
            Ok(Box::new(scorer))
        }
        other => Err(ScoringError::UnknownModel(other.to_string())),
    }
}
