//! Declarative sweep specs and their expansion into concrete strategies.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{MaskingError, MaskingResult};
use super::strategy::{ContiguousMasking, MaskingStrategy, PartitionMasking, RandomMasking};

fn default_step() -> u64 {
    1
}

/// Integer parameter given as a single value, a list, or a half-open range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntSweep {
    One(u64),
    List(Vec<u64>),
    Range {
        start: u64,
        end: u64,
        #[serde(default = "default_step")]
        step: u64,
    },
}

impl IntSweep {
    /// Concrete values in declaration order.
    pub fn values(&self) -> MaskingResult<Vec<u64>> {
        match self {
            IntSweep::One(v) => Ok(vec![*v]),
            IntSweep::List(values) => Ok(values.clone()),
            IntSweep::Range { start, end, step } => {
                if *step == 0 || start > end {
                    return Err(MaskingError::InvalidRange {
                        start: *start,
                        end: *end,
                        step: *step,
                    });
                }
                Ok((*start..*end).step_by(*step as usize).collect())
            }
        }
    }
}

/// Float parameter given as a single value or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FloatSweep {
    One(f64),
    List(Vec<f64>),
}

impl FloatSweep {
    pub fn values(&self) -> Vec<f64> {
        match self {
            FloatSweep::One(v) => vec![*v],
            FloatSweep::List(values) => values.clone(),
        }
    }
}

/// One entry of the `masking` list in a batch spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum MaskingSpec {
    Random {
        #[serde(default)]
        seeds: Option<IntSweep>,
        ratios: FloatSweep,
    },
    Contiguous {
        #[serde(default)]
        seeds: Option<IntSweep>,
        widths: IntSweep,
    },
    Partition {
        num_partitions: IntSweep,
        num_parts_to_mask: IntSweep,
    },
}

impl MaskingSpec {
    pub fn scheme(&self) -> &'static str {
        match self {
            MaskingSpec::Random { .. } => "random",
            MaskingSpec::Contiguous { .. } => "contiguous",
            MaskingSpec::Partition { .. } => "partition",
        }
    }

    /// Expands this spec; `default_seed` fills in a missing `seeds` field.
    pub fn expand(&self, default_seed: u64) -> MaskingResult<Vec<MaskingStrategy>> {
        let seeds = |spec: &Option<IntSweep>| match spec {
            Some(sweep) => sweep.values(),
            None => Ok(vec![default_seed]),
        };

        let strategies = match self {
            MaskingSpec::Random { seeds: s, ratios } => {
                let mut out = Vec::new();
                for seed in seeds(s)? {
                    for ratio in ratios.values() {
                        out.push(MaskingStrategy::Random(RandomMasking::new(ratio, seed)?));
                    }
                }
                out
            }
            MaskingSpec::Contiguous { seeds: s, widths } => {
                let mut out = Vec::new();
                for seed in seeds(s)? {
                    for width in widths.values()? {
                        out.push(MaskingStrategy::Contiguous(ContiguousMasking::new(
                            width as usize,
                            seed,
                        )));
                    }
                }
                out
            }
            MaskingSpec::Partition {
                num_partitions,
                num_parts_to_mask,
            } => {
                let mut out = Vec::new();
                for partitions in num_partitions.values()? {
                    let partitions = partitions as usize;
                    for count in num_parts_to_mask.values()? {
                        let count = count as usize;
                        if count == 0 || count > partitions {
                            warn!(
                                num_partitions = partitions,
                                num_parts_to_mask = count,
                                "Skipping partition combination that cannot be masked"
                            );
                            continue;
                        }
                        for start in 0..=partitions - count {
                            out.push(MaskingStrategy::Partition(PartitionMasking::new(
                                partitions, start, count,
                            )?));
                        }
                    }
                }
                out
            }
        };

        if strategies.is_empty() {
            return Err(MaskingError::EmptySweep {
                scheme: self.scheme(),
            });
        }

        debug!(
            scheme = self.scheme(),
            count = strategies.len(),
            "Expanded masking spec"
        );
        Ok(strategies)
    }
}

/// Expands every spec in order into one flat list of strategies.
pub fn expand(specs: &[MaskingSpec], default_seed: u64) -> MaskingResult<Vec<MaskingStrategy>> {
    let mut strategies = Vec::new();
    for spec in specs {
        strategies.extend(spec.expand(default_seed)?);
    }
    Ok(strategies)
}
