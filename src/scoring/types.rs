use serde::{Deserialize, Serialize};

/// Per-pair similarity scores, parallel to the scored (candidate, reference)
/// lists. One entry per scored masked position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub f1: Vec<f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            precision: Vec::with_capacity(capacity),
            recall: Vec::with_capacity(capacity),
            f1: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, scores: PairScore) {
        self.precision.push(scores.precision);
        self.recall.push(scores.recall);
        self.f1.push(scores.f1);
    }

    pub fn len(&self) -> usize {
        self.f1.len()
    }

    /// An empty metrics object means "nothing scored", not "scored zero".
    pub fn is_empty(&self) -> bool {
        self.f1.is_empty()
    }

    /// Copy with every score rounded to `digits` decimal places.
    pub fn rounded(&self, digits: u32) -> Self {
        let round = |values: &[f64]| -> Vec<f64> {
            values.iter().map(|v| round_to(*v, digits)).collect()
        };
        Self {
            precision: round(&self.precision),
            recall: round(&self.recall),
            f1: round(&self.f1),
        }
    }
}

/// Scores for a single (candidate, reference) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl PairScore {
    pub const ZERO: PairScore = PairScore {
        precision: 0.0,
        recall: 0.0,
        f1: 0.0,
    };

    pub fn from_precision_recall(precision: f64, recall: f64) -> Self {
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
        }
    }
}

pub fn round_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits.min(15) as i32);
    (value * scale).round() / scale
}
