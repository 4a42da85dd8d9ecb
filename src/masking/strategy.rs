use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::error::{MaskingError, MaskingResult};
use crate::hashing::hash_fields;
use crate::sequence::{SequenceResult, Video};

/// Generator for one video: the same strategy seed and video always give
/// the same stream, while different videos get different streams.
fn video_rng(seed: u64, video_id: &str) -> StdRng {
    let key = hash_fields(&[seed.to_le_bytes().as_slice(), video_id.as_bytes()]);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&key[..8]);
    StdRng::seed_from_u64(u64::from_le_bytes(bytes))
}

/// Masks `floor(num_clips * ratio)` positions sampled without replacement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomMasking {
    ratio: f64,
    seed: u64,
}

impl RandomMasking {
    pub fn new(ratio: f64, seed: u64) -> MaskingResult<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(MaskingError::InvalidRatio { ratio });
        }
        Ok(Self { ratio, seed })
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn indices(&self, video_id: &str, num_clips: usize) -> BTreeSet<usize> {
        let count = ((num_clips as f64) * self.ratio).floor() as usize;
        let count = count.min(num_clips);
        if count == 0 {
            return BTreeSet::new();
        }

        let mut rng = video_rng(self.seed, video_id);
        rand::seq::index::sample(&mut rng, num_clips, count)
            .into_iter()
            .collect()
    }
}

/// Masks one block of `width` consecutive positions at a random offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContiguousMasking {
    width: usize,
    seed: u64,
}

impl ContiguousMasking {
    pub fn new(width: usize, seed: u64) -> Self {
        Self { width, seed }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn indices(&self, video_id: &str, num_clips: usize) -> Option<BTreeSet<usize>> {
        if self.width >= num_clips {
            return None;
        }
        let mut rng = video_rng(self.seed, video_id);
        let offset = rng.gen_range(0..=num_clips - self.width);
        Some((offset..offset + self.width).collect())
    }
}

/// Masks `num_parts_to_mask` consecutive blocks out of `num_partitions`
/// nearly-equal blocks, starting at `start_partition`. No randomness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionMasking {
    num_partitions: usize,
    start_partition: usize,
    num_parts_to_mask: usize,
}

impl PartitionMasking {
    pub fn new(
        num_partitions: usize,
        start_partition: usize,
        num_parts_to_mask: usize,
    ) -> MaskingResult<Self> {
        let fits = start_partition
            .checked_add(num_parts_to_mask)
            .is_some_and(|end| end <= num_partitions);
        if num_partitions == 0 || num_parts_to_mask == 0 || !fits {
            return Err(MaskingError::InvalidPartition {
                num_partitions,
                start_partition,
                num_parts_to_mask,
            });
        }
        Ok(Self {
            num_partitions,
            start_partition,
            num_parts_to_mask,
        })
    }

    pub fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    pub fn start_partition(&self) -> usize {
        self.start_partition
    }

    pub fn num_parts_to_mask(&self) -> usize {
        self.num_parts_to_mask
    }

    fn indices(&self, num_clips: usize) -> BTreeSet<usize> {
        let bounds = partition_bounds(num_clips, self.num_partitions);
        bounds[self.start_partition..self.start_partition + self.num_parts_to_mask]
            .iter()
            .flat_map(Clone::clone)
            .collect()
    }
}

/// Splits `0..num_clips` into `num_partitions` contiguous blocks; the first
/// `num_clips % num_partitions` blocks get one extra element.
pub fn partition_bounds(num_clips: usize, num_partitions: usize) -> Vec<Range<usize>> {
    if num_partitions == 0 {
        return Vec::new();
    }
    let base = num_clips / num_partitions;
    let extra = num_clips % num_partitions;

    let mut start = 0;
    (0..num_partitions)
        .map(|i| {
            let len = base + usize::from(i < extra);
            let block = start..start + len;
            start += len;
            block
        })
        .collect()
}

/// Result of applying a strategy to one video.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskOutcome {
    /// The strategy cannot be applied to a sequence of this length.
    NotApplicable,
    /// The strategy selected nothing; there is nothing to reconstruct.
    Empty,
    /// The masked copy and the indices that were hidden.
    Masked {
        video: Video,
        indices: BTreeSet<usize>,
    },
}

/// Closed set of masking rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum MaskingStrategy {
    Random(RandomMasking),
    Contiguous(ContiguousMasking),
    Partition(PartitionMasking),
}

impl MaskingStrategy {
    /// Indices to hide in video `video_id` of `num_clips` clips, or `None`
    /// if the rule does not fit that length.
    pub fn indices(&self, video_id: &str, num_clips: usize) -> Option<BTreeSet<usize>> {
        match self {
            MaskingStrategy::Random(s) => Some(s.indices(video_id, num_clips)),
            MaskingStrategy::Contiguous(s) => s.indices(video_id, num_clips),
            MaskingStrategy::Partition(s) => Some(s.indices(num_clips)),
        }
    }

    /// Masks `video` according to this strategy.
    pub fn apply(&self, video: &Video) -> SequenceResult<MaskOutcome> {
        let Some(indices) = self.indices(video.video_id(), video.len()) else {
            return Ok(MaskOutcome::NotApplicable);
        };
        if indices.is_empty() {
            return Ok(MaskOutcome::Empty);
        }
        let masked = video.mask(&indices)?;
        Ok(MaskOutcome::Masked {
            video: masked,
            indices,
        })
    }

    /// Parameter dump used for run tracking.
    pub fn params(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Short identifier used in run names.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MaskingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskingStrategy::Random(s) => write!(f, "random_r{}_s{}", s.ratio, s.seed),
            MaskingStrategy::Contiguous(s) => write!(f, "contiguous_w{}_s{}", s.width, s.seed),
            MaskingStrategy::Partition(s) => write!(
                f,
                "partition_p{}_k{}_s{}",
                s.num_partitions, s.num_parts_to_mask, s.start_partition
            ),
        }
    }
}
