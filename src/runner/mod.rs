//! Per-run experiment loop.
//!
//! For one masking strategy and one reconstruction strategy, every video goes
//! through `mask -> reconstruct -> validate -> evaluate -> accumulate`, one at
//! a time. A video that cannot be scored is written with a skip reason and
//! left out of the aggregates; only a silent mask/reconstruction mismatch
//! stops the run.

pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{RunnerError, RunnerResult};
pub use types::{AggregationMode, Aggregator, RunSummary, VideoOutcome};

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::evaluation::Evaluator;
use crate::masking::{MaskOutcome, MaskingStrategy};
use crate::reconstruction::{Reconstructed, ReconstructionStrategy};
use crate::sequence::Video;
use crate::storage::ArtifactWriter;

#[derive(Debug, Clone)]
pub struct ExperimentRunner {
    evaluator: Evaluator,
    aggregation: AggregationMode,
}

impl ExperimentRunner {
    pub fn new(evaluator: Evaluator, aggregation: AggregationMode) -> Self {
        Self {
            evaluator,
            aggregation,
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn aggregation(&self) -> AggregationMode {
        self.aggregation
    }

    /// Runs one video through the pipeline.
    pub async fn process_video(
        &self,
        video: &Video,
        masking: &MaskingStrategy,
        strategy: &ReconstructionStrategy,
    ) -> RunnerResult<VideoOutcome> {
        let video_id = video.video_id();
        let blank = || Reconstructed::new(video_id, BTreeMap::new());

        let (masked, indices) = match masking.apply(video)? {
            MaskOutcome::NotApplicable => {
                warn!(video_id, masking = %masking, clips = video.len(), "Masking not applicable");
                return Ok(VideoOutcome::skipped(blank(), "masking not applicable"));
            }
            MaskOutcome::Empty => {
                warn!(video_id, masking = %masking, "Empty mask, nothing to reconstruct");
                return Ok(VideoOutcome::skipped(blank(), "empty mask"));
            }
            MaskOutcome::Masked { video, indices } => (video, indices),
        };

        info!(video_id, masked = indices.len(), clips = video.len(), strategy = %strategy, "Reconstructing");
        let result = strategy.reconstruct(&masked, &indices).await?;

        if let Some(error) = result.error() {
            let reason = format!("reconstruction failed: {error}");
            warn!(video_id, %reason, "Skipping video");
            return Ok(VideoOutcome::skipped(result, reason));
        }
        if result.reconstructed_captions.is_empty() && result.debug_data.is_none() {
            warn!(video_id, "Empty reconstruction, skipping video");
            return Ok(VideoOutcome::skipped(result, "empty reconstruction"));
        }

        if !check_indices(video_id, &result, &indices)? {
            return Ok(VideoOutcome::skipped(result, "reconstructed indices do not match mask"));
        }

        let metrics = match self.evaluator.evaluate(&result, video) {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!(video_id, error = %e, "Evaluation failed, skipping video");
                return Ok(VideoOutcome::skipped(result, format!("evaluation failed: {e}")));
            }
        };
        if metrics.is_empty() {
            return Ok(VideoOutcome::skipped(result, "nothing to score"));
        }

        let rounded = self.evaluator.round(&metrics);
        info!(video_id, pairs = metrics.len(), "Scored video");
        Ok(VideoOutcome {
            record: result.with_metrics(rounded),
            raw_metrics: Some(metrics),
        })
    }

    /// Runs every video, writing one artifact record per video.
    pub async fn run(
        &self,
        run_name: &str,
        videos: &[Video],
        masking: &MaskingStrategy,
        strategy: &ReconstructionStrategy,
        artifacts: &mut ArtifactWriter,
    ) -> RunnerResult<RunSummary> {
        info!(run_name, videos = videos.len(), "Starting run");

        let mut aggregator = Aggregator::new(self.aggregation);
        let mut skipped = 0usize;

        for video in videos {
            let outcome = self.process_video(video, masking, strategy).await?;
            match &outcome.raw_metrics {
                Some(metrics) => aggregator.add(metrics),
                None => skipped += 1,
            }
            artifacts.write(&outcome.record)?;
        }

        let summary = RunSummary {
            run_name: run_name.to_string(),
            total: videos.len(),
            scored: aggregator.videos(),
            skipped,
            aggregation: self.aggregation,
            mean_precision: aggregator.mean_precision(),
            mean_recall: aggregator.mean_recall(),
            mean_f1: aggregator.mean_f1(),
        };
        info!(
            run_name,
            scored = summary.scored,
            skipped = summary.skipped,
            mean_f1 = ?summary.mean_f1,
            "Run finished"
        );
        Ok(summary)
    }
}

/// Compares a reconstruction's indices with the mask set.
///
/// A mismatch explained by debug data yields `Ok(false)`; an unexplained one
/// is a [`RunnerError::MaskMismatch`].
pub(crate) fn check_indices(
    video_id: &str,
    result: &Reconstructed,
    mask: &BTreeSet<usize>,
) -> RunnerResult<bool> {
    let found = result.indices();
    if found == *mask {
        return Ok(true);
    }

    let expected: Vec<usize> = mask.iter().copied().collect();
    let found: Vec<usize> = found.into_iter().collect();
    if result.debug_data.is_none() {
        return Err(RunnerError::MaskMismatch {
            video_id: video_id.to_string(),
            expected,
            found,
        });
    }
    warn!(video_id, ?expected, ?found, "Reconstructed indices differ from mask");
    Ok(false)
}
