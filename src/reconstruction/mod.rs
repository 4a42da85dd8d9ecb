//! Reconstruction strategies.
//!
//! A strategy takes a masked [`Video`] and proposes captions for its masked
//! clips. Ordinary failures (oracle errors, unparsable or inconsistent
//! responses) never surface as `Err`: they come back as a [`Reconstructed`]
//! with [`DebugData`] describing what went wrong. `Err` is reserved for
//! misconfiguration.
//!
//! Strategies form a closed set ([`ReconstructionStrategy`]) built from the
//! declarative [`ReconstructionSpec`].

pub mod carry_forward;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod types;


pub use carry_forward::{CarryForwardStrategy, carry_forward};
pub use error::{ParseError, ReconstructionError, ReconstructionResult};
pub use llm::{LlmStrategy, reconcile};
pub use parse::{ParsedClip, parse_response};
pub use prompt::{PromptFormat, build_prompt};
pub use types::{DebugData, Reconstructed};

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::DEFAULT_INSTRUCTION;
use crate::oracle::{OracleClient, OracleSettings, ResponseFormat};
use crate::sequence::Video;

#[derive(Debug, Clone)]
pub enum ReconstructionStrategy {
    CarryForward(CarryForwardStrategy),
    Llm(LlmStrategy),
}

impl ReconstructionStrategy {
    /// Proposes captions for the positions in `mask` of the masked `video`.
    pub async fn reconstruct(
        &self,
        video: &Video,
        mask: &BTreeSet<usize>,
    ) -> ReconstructionResult<Reconstructed> {
        match self {
            ReconstructionStrategy::CarryForward(_) => {
                Ok(Reconstructed::new(video.video_id(), carry_forward(video, mask)))
            }
            ReconstructionStrategy::Llm(strategy) => strategy.reconstruct(video, mask).await,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ReconstructionStrategy::CarryForward(strategy) => strategy.name(),
            ReconstructionStrategy::Llm(strategy) => strategy.name(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReconstructionStrategy::CarryForward(_) => "carry_forward",
            ReconstructionStrategy::Llm(_) => "llm",
        }
    }

    /// Parameter dump for run tracking.
    pub fn params(&self) -> serde_json::Value {
        match self {
            ReconstructionStrategy::CarryForward(strategy) => json!({
                "kind": self.kind(),
                "name": strategy.name(),
            }),
            ReconstructionStrategy::Llm(strategy) => json!({
                "kind": self.kind(),
                "name": strategy.name(),
                "model": strategy.settings().model,
                "temperature": strategy.settings().temperature,
                "seed": strategy.settings().seed,
                "response_format": strategy.settings().response_format,
                "format": strategy.format(),
            }),
        }
    }
}

impl fmt::Display for ReconstructionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declarative description of a reconstruction strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconstructionSpec {
    CarryForward {
        #[serde(default)]
        name: Option<String>,
    },
    Llm {
        #[serde(default)]
        name: Option<String>,
        model: String,
        #[serde(default)]
        temperature: f64,
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        instruction: Option<String>,
        #[serde(default)]
        instruction_path: Option<PathBuf>,
        #[serde(default)]
        format: PromptFormat,
        #[serde(default)]
        response_format: ResponseFormat,
    },
}

impl ReconstructionSpec {
    pub fn name(&self) -> String {
        match self {
            ReconstructionSpec::CarryForward { name } => name
                .clone()
                .unwrap_or_else(|| CarryForwardStrategy::DEFAULT_NAME.to_string()),
            ReconstructionSpec::Llm { name, model, .. } => {
                name.clone().unwrap_or_else(|| format!("llm_{model}"))
            }
        }
    }

    pub fn needs_oracle(&self) -> bool {
        matches!(self, ReconstructionSpec::Llm { .. })
    }

    /// Builds the concrete strategy. LLM strategies need `client`.
    pub fn build(
        &self,
        client: Option<&Arc<OracleClient>>,
    ) -> ReconstructionResult<ReconstructionStrategy> {
        let name = self.name();
        match self {
            ReconstructionSpec::CarryForward { .. } => Ok(ReconstructionStrategy::CarryForward(
                CarryForwardStrategy::new(name),
            )),
            ReconstructionSpec::Llm {
                model,
                temperature,
                seed,
                instruction,
                instruction_path,
                format,
                response_format,
                ..
            } => {
                if model.trim().is_empty() {
                    return Err(ReconstructionError::EmptyModel { strategy: name });
                }
                let instruction = match (instruction, instruction_path) {
                    (Some(_), Some(_)) => {
                        return Err(ReconstructionError::InstructionConflict { strategy: name });
                    }
                    (Some(text), None) => text.clone(),
                    (None, Some(path)) => std::fs::read_to_string(path).map_err(|source| {
                        ReconstructionError::InstructionUnreadable {
                            path: path.clone(),
                            source,
                        }
                    })?,
                    (None, None) => DEFAULT_INSTRUCTION.to_string(),
                };
                let Some(client) = client else {
                    return Err(ReconstructionError::MissingOracle { strategy: name });
                };

                let mut settings = OracleSettings::new(model.clone())
                    .temperature(*temperature)
                    .response_format(*response_format);
                settings.seed = *seed;

                Ok(ReconstructionStrategy::Llm(LlmStrategy::new(
                    name,
                    settings,
                    instruction,
                    *format,
                    Arc::clone(client),
                )))
            }
        }
    }
}
