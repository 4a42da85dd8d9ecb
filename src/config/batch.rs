use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::masking::{self, MaskingSpec, MaskingStrategy};
use crate::reconstruction::ReconstructionSpec;
use crate::runner::AggregationMode;
use crate::scoring::TOKEN_OVERLAP_MODEL;
use crate::storage::{artifact_file_name, run_name};

fn default_scoring_model() -> String {
    TOKEN_OVERLAP_MODEL.to_string()
}

/// Scoring settings for a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSpec {
    #[serde(default = "default_scoring_model")]
    pub model: String,
    /// Fit IDF weights over the full dataset corpus.
    #[serde(default)]
    pub idf: bool,
    #[serde(default)]
    pub aggregation: AggregationMode,
}

impl Default for EvaluationSpec {
    fn default() -> Self {
        Self {
            model: default_scoring_model(),
            idf: false,
            aggregation: AggregationMode::default(),
        }
    }
}

/// The merged experiment configuration consumed by the batch orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchSpec {
    pub batch_name: String,
    /// Seed for masking specs that do not list their own.
    #[serde(default)]
    pub master_seed: u64,
    pub masking: Vec<MaskingSpec>,
    pub strategies: Vec<ReconstructionSpec>,
    #[serde(default)]
    pub evaluation: EvaluationSpec,
    /// Maximum number of videos to process.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl BatchSpec {
    pub fn from_json(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::ParseBatch {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and validates a batch spec file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadBatch {
            path: path.to_path_buf(),
            source,
        })?;
        let spec = Self::from_json(&text, path)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "batch_name",
                value: self.batch_name.clone(),
                reason: "must not be blank",
            });
        }
        if self.masking.is_empty() {
            return Err(ConfigError::EmptyField { field: "masking" });
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::EmptyField { field: "strategies" });
        }
        if self.limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: "limit",
                value: String::from("0"),
                reason: "must be at least 1 when set",
            });
        }

        let mut names = HashSet::new();
        for strategy in &self.strategies {
            let name = strategy.name();
            if !names.insert(name.clone()) {
                return Err(ConfigError::DuplicateStrategy(name));
            }
        }

        let mut files = HashSet::new();
        for run_name in self.run_names()? {
            let file = artifact_file_name(&run_name);
            if !files.insert(file.clone()) {
                return Err(ConfigError::DuplicateRun { run_name, file });
            }
        }
        Ok(())
    }

    /// Run names in execution order: strategies outer, masking inner.
    pub fn run_names(&self) -> Result<Vec<String>, ConfigError> {
        let masking = self.masking_strategies()?;
        Ok(self
            .strategies
            .iter()
            .flat_map(|strategy| {
                let strategy = strategy.name();
                masking
                    .iter()
                    .map(move |m| run_name(&strategy, &m.name()))
            })
            .collect())
    }

    /// Every concrete masking strategy, in stable declaration order.
    pub fn masking_strategies(&self) -> Result<Vec<MaskingStrategy>, ConfigError> {
        Ok(masking::expand(&self.masking, self.master_seed)?)
    }

    pub fn needs_oracle(&self) -> bool {
        self.strategies.iter().any(ReconstructionSpec::needs_oracle)
    }
}
