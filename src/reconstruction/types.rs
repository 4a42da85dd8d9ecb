use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::scoring::Metrics;

/// Diagnostics attached to a reconstruction that did not fully succeed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Indices that appeared more than once in the oracle response.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dups: Vec<usize>,
    /// Masked indices the oracle left out.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<usize>,
    /// Unmasked indices whose caption the oracle altered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed_unmasked: Vec<usize>,
    /// Raw oracle response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl DebugData {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }
}

/// Outcome of reconstructing one video.
///
/// After construction the only transitions are [`with_skip_reason`] and
/// [`with_metrics`]; both are idempotent and chainable.
///
/// [`with_skip_reason`]: Reconstructed::with_skip_reason
/// [`with_metrics`]: Reconstructed::with_metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconstructed {
    pub video_id: String,
    #[serde(default)]
    pub reconstructed_captions: BTreeMap<usize, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_data: Option<DebugData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

impl Reconstructed {
    pub fn new(video_id: impl Into<String>, captions: BTreeMap<usize, String>) -> Self {
        Self {
            video_id: video_id.into(),
            reconstructed_captions: captions,
            debug_data: None,
            skip_reason: None,
            metrics: None,
        }
    }

    /// Structural failure: no captions, debug data carrying `error`.
    pub fn failed(video_id: impl Into<String>, debug: DebugData) -> Self {
        Self::new(video_id, BTreeMap::new()).with_debug(debug)
    }

    pub(crate) fn with_debug(mut self, debug: DebugData) -> Self {
        self.debug_data = Some(debug);
        self
    }

    pub fn with_skip_reason(mut self, reason: impl Into<String>) -> Self {
        self.skip_reason = Some(reason.into());
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Error message of a structurally failed reconstruction.
    pub fn error(&self) -> Option<&str> {
        self.debug_data.as_ref().and_then(|d| d.error.as_deref())
    }

    pub fn is_failed(&self) -> bool {
        self.error().is_some()
    }

    pub fn is_skipped(&self) -> bool {
        self.skip_reason.is_some()
    }

    pub fn is_scored(&self) -> bool {
        self.metrics.is_some()
    }

    pub fn indices(&self) -> BTreeSet<usize> {
        self.reconstructed_captions.keys().copied().collect()
    }
}
