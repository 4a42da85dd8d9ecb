//! Batch orchestration.
//!
//! A batch is the cross product of reconstruction strategies (outer loop)
//! and concrete masking strategies (inner loop). Each pair is one run named
//! `{strategy}_{masking}`, with its own artifact log and one record in the
//! batch run log. Runs execute one after another.

pub mod error;
pub mod lock;


pub use error::{BatchError, BatchResult};
pub use lock::BatchLock;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::cache::{CacheStats, ResponseCache};
use crate::config::{BatchSpec, EvaluationSpec};
use crate::dataset;
use crate::evaluation::Evaluator;
use crate::masking::MaskingStrategy;
use crate::oracle::OracleClient;
use crate::reconstruction::ReconstructionStrategy;
use crate::runner::{ExperimentRunner, RunSummary};
use crate::scoring::scorer_for;
use crate::sequence::Video;
use crate::storage::{ArtifactWriter, RunLog, RunRecord, artifact_file_name, run_name};

/// Builds the evaluator named by `spec`, fitting IDF over every caption in
/// `videos` when enabled.
pub fn build_evaluator(
    spec: &EvaluationSpec,
    videos: &[Video],
    round_digits: u32,
) -> BatchResult<Evaluator> {
    let corpus = if spec.idf {
        dataset::corpus(videos)
    } else {
        Vec::new()
    };
    let scorer = scorer_for(&spec.model, spec.idf, corpus)?;
    Ok(Evaluator::new(Arc::from(scorer)).with_round_digits(round_digits))
}

/// Summary of a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub runs: Vec<RunSummary>,
    pub cache: Option<CacheStats>,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "batch {} ({} runs)", self.batch_name, self.runs.len())?;
        for run in &self.runs {
            writeln!(f, "  {run}")?;
        }
        if let Some(cache) = &self.cache {
            write!(
                f,
                "  oracle cache: {} memory hits, {} disk hits, {} misses, {} stored",
                cache.memory_hits, cache.disk_hits, cache.misses, cache.stores
            )?;
        }
        Ok(())
    }
}

/// Configured batch ready to run.
#[derive(Debug)]
pub struct Batch {
    spec: BatchSpec,
    output_dir: PathBuf,
    runner: ExperimentRunner,
    strategies: Vec<ReconstructionStrategy>,
    masking: Vec<MaskingStrategy>,
    cache: Option<Arc<ResponseCache>>,
    run_log: RunLog,
}

impl Batch {
    /// Validates `spec` and builds every strategy. `client` is required when
    /// the spec names an LLM strategy.
    pub fn new(
        spec: BatchSpec,
        output_dir: impl Into<PathBuf>,
        evaluator: Evaluator,
        client: Option<Arc<OracleClient>>,
    ) -> BatchResult<Self> {
        spec.validate()?;

        let strategies = spec
            .strategies
            .iter()
            .map(|s| s.build(client.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let masking = spec.masking_strategies()?;
        let runner = ExperimentRunner::new(evaluator, spec.evaluation.aggregation);
        let cache = client.as_ref().and_then(|c| c.cache().cloned());

        let output_dir = output_dir.into();
        let run_log = RunLog::new(output_dir.join(crate::constants::RUN_LOG_FILE));

        Ok(Self {
            spec,
            output_dir,
            runner,
            strategies,
            masking,
            cache,
            run_log,
        })
    }

    pub fn spec(&self) -> &BatchSpec {
        &self.spec
    }

    pub fn run_log(&self) -> &RunLog {
        &self.run_log
    }

    /// `(strategy, masking)` pairs in execution order.
    pub fn plan(&self) -> Vec<(&ReconstructionStrategy, &MaskingStrategy)> {
        self.strategies
            .iter()
            .flat_map(|strategy| self.masking.iter().map(move |masking| (strategy, masking)))
            .collect()
    }

    pub fn run_name(strategy: &ReconstructionStrategy, masking: &MaskingStrategy) -> String {
        run_name(strategy.name(), &masking.name())
    }

    /// Runs every pair over `videos` (truncated to the spec's `limit`).
    pub async fn run(&self, videos: &[Video]) -> BatchResult<BatchReport> {
        let videos = match self.spec.limit {
            Some(limit) => &videos[..videos.len().min(limit)],
            None => videos,
        };
        if videos.is_empty() {
            return Err(BatchError::NoVideos);
        }

        let plan = self.plan();
        info!(
            batch = %self.spec.batch_name,
            runs = plan.len(),
            videos = videos.len(),
            "Starting batch"
        );

        let started_at = Utc::now();
        let mut runs = Vec::with_capacity(plan.len());

        for (strategy, masking) in plan {
            let run_name = Self::run_name(strategy, masking);
            let artifact_path = self.output_dir.join(artifact_file_name(&run_name));
            let mut artifacts = ArtifactWriter::create(&artifact_path)?;

            let run_started = Utc::now();
            let summary = self
                .runner
                .run(&run_name, videos, masking, strategy, &mut artifacts)
                .await?;

            self.run_log.append(&RunRecord {
                run_id: Uuid::new_v4(),
                run_name,
                batch_name: self.spec.batch_name.clone(),
                strategy: strategy.params(),
                masking: masking.params(),
                started_at: run_started,
                finished_at: Utc::now(),
                artifact_path,
                summary: summary.clone(),
            })?;
            runs.push(summary);
        }

        let report = BatchReport {
            batch_name: self.spec.batch_name.clone(),
            started_at,
            finished_at: Utc::now(),
            runs,
            cache: self.cache.as_ref().map(|c| c.stats()),
        };
        info!(batch = %report.batch_name, runs = report.runs.len(), "Batch finished");
        Ok(report)
    }
}
