//! Masked caption reconstruction benchmark (library used by the `recon`
//! binary and integration tests).
//!
//! # Pipeline
//!
//! A video is an index-validated sequence of captioned clips
//! ([`Video`]). For each (reconstruction strategy x masking strategy) pair the
//! [`ExperimentRunner`] masks each video, asks the strategy to fill the gaps,
//! checks the answer against the mask, scores it against the ground truth,
//! and aggregates per-video scores into batch means.
//!
//! ## Modules
//! - [`sequence`] - [`Clip`], [`TimeRange`], [`Video`]
//! - [`masking`] - random / contiguous / partition strategies and sweeps
//! - [`reconstruction`] - carry-forward baseline and the LLM strategy
//! - [`oracle`], [`cache`], [`hashing`] - the cached, retrying LLM boundary
//! - [`scoring`], [`evaluation`] - alignment and similarity scoring
//! - [`runner`], [`batch`] - per-run loop, batch orchestration, batch lock
//! - [`storage`] - JSONL artifact logs and the run log
//! - [`dataset`], [`config`], [`constants`]
//!
//! ## Test/Mock Support
//! [`MockOracle`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod batch;
pub mod cache;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod evaluation;
pub mod hashing;
pub mod masking;
pub mod oracle;
pub mod reconstruction;
pub mod runner;
pub mod scoring;
pub mod sequence;
pub mod storage;

pub use batch::{Batch, BatchError, BatchLock, BatchReport, build_evaluator};
pub use cache::{CacheStats, CacheStatus, ResponseCache};
pub use config::{BatchSpec, Config, ConfigError, EvaluationSpec};
pub use dataset::{DatasetError, load_videos, toy_video};
pub use evaluation::{EvaluationError, Evaluator, align};
pub use hashing::{hash_fields, hash_prompt, key_to_hex};
pub use masking::{MaskOutcome, MaskingError, MaskingSpec, MaskingStrategy};
#[cfg(any(test, feature = "mock"))]
pub use oracle::MockOracle;
pub use oracle::{
    CompletionOracle, GenaiOracle, OracleClient, OracleError, OracleRequest, OracleSettings,
    ResponseFormat, RetryPolicy,
};
pub use reconstruction::{
    DebugData, PromptFormat, Reconstructed, ReconstructionError, ReconstructionSpec,
    ReconstructionStrategy,
};
pub use runner::{AggregationMode, ExperimentRunner, RunSummary, RunnerError};
pub use scoring::{IdfTable, Metrics, ScoringError, SimilarityScorer, TokenOverlapScorer};
pub use sequence::{Clip, SequenceError, TimeRange, Video};
pub use storage::{ArtifactLog, ArtifactWriter, RunLog, RunRecord, StorageError, read_artifacts};
