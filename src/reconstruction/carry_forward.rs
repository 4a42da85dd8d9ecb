use std::collections::{BTreeMap, BTreeSet};

use crate::sequence::{Clip, Video};

/// Fills each position in `mask` with the most recent visible caption.
///
/// Leading masked clips take the first visible caption that follows them.
/// Clips outside `mask` that have no caption are neither filled nor used as
/// a source. A fully masked video yields no captions.
pub fn carry_forward(video: &Video, mask: &BTreeSet<usize>) -> BTreeMap<usize, String> {
    let visible = |clip: &&Clip| !mask.contains(&clip.index());
    let mut last_known = video.clips().iter().filter(visible).find_map(Clip::caption);
    let mut captions = BTreeMap::new();

    for clip in video.clips() {
        if mask.contains(&clip.index()) {
            if let Some(caption) = last_known {
                captions.insert(clip.index(), caption.to_string());
            }
        } else if let Some(caption) = clip.caption() {
            last_known = Some(caption);
        }
    }

    captions
}

/// Baseline strategy wrapping [`carry_forward`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarryForwardStrategy {
    name: String,
}

impl CarryForwardStrategy {
    pub const DEFAULT_NAME: &'static str = "carry_forward";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for CarryForwardStrategy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}
