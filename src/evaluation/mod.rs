//! Alignment of reconstructions with ground truth, and scoring.

pub mod error;


pub use error::{EvaluationError, EvaluationResult};

use std::sync::Arc;

use tracing::debug;

use crate::constants::DEFAULT_ROUND_DIGITS;
use crate::reconstruction::Reconstructed;
use crate::scoring::{Metrics, SimilarityScorer};
use crate::sequence::{Clip, Video};

/// Pairs each reconstructed caption with the original caption at the same
/// index, in index order.
///
/// Positions whose original clip has no caption are left out. An empty
/// reconstruction gives two empty lists.
pub fn align(
    reconstructed: &Reconstructed,
    original_clips: &[Clip],
) -> EvaluationResult<(Vec<String>, Vec<String>)> {
    let count = reconstructed.reconstructed_captions.len();
    let mut candidates = Vec::with_capacity(count);
    let mut references = Vec::with_capacity(count);

    for (&index, caption) in &reconstructed.reconstructed_captions {
        let clip = original_clips.get(index);
        let Some(clip) = clip.filter(|clip| clip.index() == index) else {
            return Err(EvaluationError::IndexMismatch {
                index,
                found: clip.map(Clip::index),
            });
        };
        let Some(reference) = clip.caption() else {
            debug!(index, "No ground-truth caption, leaving clip unscored");
            continue;
        };
        candidates.push(caption.clone());
        references.push(reference.to_string());
    }

    Ok((candidates, references))
}

/// Scores reconstructions against original videos.
#[derive(Clone)]
pub struct Evaluator {
    scorer: Arc<dyn SimilarityScorer>,
    round_digits: u32,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("model", &self.scorer.model())
            .field("round_digits", &self.round_digits)
            .finish()
    }
}

impl Evaluator {
    pub fn new(scorer: Arc<dyn SimilarityScorer>) -> Self {
        Self {
            scorer,
            round_digits: DEFAULT_ROUND_DIGITS,
        }
    }

    pub fn with_round_digits(mut self, digits: u32) -> Self {
        self.round_digits = digits;
        self
    }

    pub fn model(&self) -> &str {
        self.scorer.model()
    }

    pub fn round_digits(&self) -> u32 {
        self.round_digits
    }

    /// Raw per-pair scores. Empty metrics mean "nothing to score".
    pub fn evaluate(
        &self,
        reconstructed: &Reconstructed,
        original: &Video,
    ) -> EvaluationResult<Metrics> {
        let (candidates, references) = align(reconstructed, original.clips())?;
        if candidates.is_empty() {
            debug!(video_id = %reconstructed.video_id, "Nothing to score");
            return Ok(Metrics::new());
        }
        Ok(self.scorer.score(&candidates, &references)?)
    }

    /// Metrics as persisted in artifacts.
    pub fn round(&self, metrics: &Metrics) -> Metrics {
        metrics.rounded(self.round_digits)
    }
}
