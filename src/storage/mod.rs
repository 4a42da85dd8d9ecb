//! Persisted outputs: per-run artifact logs and the batch run log.
//!
//! Both are JSON lines. Artifact records are [`Reconstructed`](crate::reconstruction::Reconstructed)
//! values; absence of `metrics` means "not scored".

pub mod artifact;
pub mod error;
pub mod run_log;

#[cfg(test)]
mod tests;

pub use artifact::{ArtifactLog, ArtifactSummary, ArtifactWriter, read_artifacts};
pub use error::{StorageError, StorageResult};
pub use run_log::{RunLog, RunRecord};

/// Name of the run pairing a reconstruction strategy with a masking strategy.
pub fn run_name(strategy: &str, masking: &str) -> String {
    format!("{strategy}_{masking}")
}

/// File name for a run's artifact log; characters unsafe in paths become `_`.
pub fn artifact_file_name(run_name: &str) -> String {
    let stem: String = run_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.jsonl")
}
