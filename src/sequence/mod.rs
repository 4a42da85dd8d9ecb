//! Immutable clip and video value types.
//!
//! A [`Video`] owns an ordered list of [`Clip`]s whose `index` equals their
//! position. A clip whose caption is `None` is masked; an empty string is a
//! real caption. Every transformation (masking included) returns a new value.

pub mod error;


pub use error::{SequenceError, SequenceResult};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Time span of a clip, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TimeRangeRepr")]
pub struct TimeRange {
    start: f64,
    duration: f64,
}

#[derive(Deserialize)]
struct TimeRangeRepr {
    start: f64,
    duration: f64,
}

impl TryFrom<TimeRangeRepr> for TimeRange {
    type Error = SequenceError;

    fn try_from(repr: TimeRangeRepr) -> Result<Self, Self::Error> {
        Self::new(repr.start, repr.duration)
    }
}

impl TimeRange {
    /// Creates a range; both values must be finite and non-negative.
    pub fn new(start: f64, duration: f64) -> SequenceResult<Self> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !valid(start) || !valid(duration) {
            return Err(SequenceError::InvalidTimeRange { start, duration });
        }
        Ok(Self { start, duration })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// One timestamped unit of a video's caption sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    index: usize,
    time_range: TimeRange,
    caption: Option<String>,
}

impl Clip {
    pub fn new(index: usize, time_range: TimeRange, caption: Option<String>) -> Self {
        Self {
            index,
            time_range,
            caption,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    /// Returns the caption, or `None` if the clip is masked.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    #[inline]
    pub fn is_masked(&self) -> bool {
        self.caption.is_none()
    }

    /// Returns a copy of this clip with its caption removed.
    pub fn masked(&self) -> Self {
        Self {
            caption: None,
            ..self.clone()
        }
    }
}

/// An ordered, index-validated sequence of clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VideoRepr")]
pub struct Video {
    video_id: String,
    clips: Vec<Clip>,
}

#[derive(Deserialize)]
struct VideoRepr {
    video_id: String,
    clips: Vec<Clip>,
}

impl TryFrom<VideoRepr> for Video {
    type Error = SequenceError;

    fn try_from(repr: VideoRepr) -> Result<Self, Self::Error> {
        Self::new(repr.video_id, repr.clips)
    }
}

impl Video {
    /// Builds a video, rejecting clip lists whose indices are not `0..len`.
    pub fn new(video_id: impl Into<String>, clips: Vec<Clip>) -> SequenceResult<Self> {
        validate_clips(&clips)?;
        Ok(Self {
            video_id: video_id.into(),
            clips,
        })
    }

    /// Builds a video from captions alone, one second per clip.
    pub fn from_captions<I, S>(video_id: impl Into<String>, captions: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let clips = captions
            .into_iter()
            .enumerate()
            .map(|(index, caption)| Clip {
                index,
                time_range: TimeRange {
                    start: index as f64,
                    duration: 1.0,
                },
                caption: caption.map(Into::into),
            })
            .collect();

        Self {
            video_id: video_id.into(),
            clips,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clip(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    /// Re-checks the index invariant.
    pub fn validate(&self) -> SequenceResult<()> {
        validate_clips(&self.clips)
    }

    /// Indices of clips that currently have no caption.
    pub fn masked_indices(&self) -> BTreeSet<usize> {
        self.clips
            .iter()
            .filter(|c| c.is_masked())
            .map(Clip::index)
            .collect()
    }

    /// Returns a new video whose clips at `indices` are masked.
    pub fn mask(&self, indices: &BTreeSet<usize>) -> SequenceResult<Self> {
        if let Some(&index) = indices.iter().next_back()
            && index >= self.clips.len()
        {
            return Err(SequenceError::MaskIndexOutOfRange {
                index,
                len: self.clips.len(),
            });
        }

        let clips = self
            .clips
            .iter()
            .map(|clip| {
                if indices.contains(&clip.index) {
                    clip.masked()
                } else {
                    clip.clone()
                }
            })
            .collect();

        Ok(Self {
            video_id: self.video_id.clone(),
            clips,
        })
    }
}

/// Fails on the first clip whose index differs from its position.
pub fn validate_clips(clips: &[Clip]) -> SequenceResult<()> {
    match clips
        .iter()
        .enumerate()
        .find(|(position, clip)| clip.index != *position)
    {
        Some((position, clip)) => Err(SequenceError::IndexMismatch {
            position,
            found: clip.index,
        }),
        None => Ok(()),
    }
}
