use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::ReconstructionResult;
use super::parse::{ParsedClip, duplicate_indices, parse_response};
use super::prompt::{PromptFormat, build_prompt};
use super::types::{DebugData, Reconstructed};
use crate::oracle::{OracleClient, OracleRequest, OracleSettings};
use crate::sequence::Video;

/// Oracle-backed reconstruction: prompt, cached/retried call, parse, reconcile.
#[derive(Debug, Clone)]
pub struct LlmStrategy {
    name: String,
    settings: OracleSettings,
    instruction: String,
    format: PromptFormat,
    client: Arc<OracleClient>,
}

impl LlmStrategy {
    pub fn new(
        name: impl Into<String>,
        settings: OracleSettings,
        instruction: impl Into<String>,
        format: PromptFormat,
        client: Arc<OracleClient>,
    ) -> Self {
        Self {
            name: name.into(),
            settings,
            instruction: instruction.into(),
            format,
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    pub fn format(&self) -> PromptFormat {
        self.format
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn prompt(&self, video: &Video) -> ReconstructionResult<String> {
        Ok(build_prompt(&self.instruction, video, self.format)?)
    }

    pub async fn reconstruct(
        &self,
        video: &Video,
        mask: &BTreeSet<usize>,
    ) -> ReconstructionResult<Reconstructed> {
        let video_id = video.video_id();
        let request = OracleRequest::new(self.settings.clone(), self.prompt(video)?);

        let reply = match self.client.complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(video_id, error = %e, "Oracle call failed");
                return Ok(Reconstructed::failed(video_id, DebugData::error(e.to_string())));
            }
        };

        debug!(video_id, cache = %reply.cache, attempts = reply.attempts, "Oracle reply");

        let parsed = match parse_response(&reply.text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(video_id, error = %e, "Unparsable oracle response");
                return Ok(Reconstructed::failed(
                    video_id,
                    DebugData::error(format!("parse error: {e}")).with_response(reply.text),
                ));
            }
        };

        Ok(reconcile(video, mask, &parsed, reply.text))
    }
}

/// Checks parsed clips against `mask` and keeps the captions for those
/// positions only.
pub fn reconcile(
    video: &Video,
    mask: &BTreeSet<usize>,
    parsed: &[ParsedClip],
    response: String,
) -> Reconstructed {
    let video_id = video.video_id();

    let dups = duplicate_indices(parsed);
    if !dups.is_empty() {
        warn!(video_id, ?dups, "Oracle response repeats indices");
        return Reconstructed::failed(
            video_id,
            DebugData {
                error: Some(String::from("duplicate indices")),
                dups,
                ..DebugData::default()
            }
            .with_response(response),
        );
    }

    if parsed.is_empty() {
        warn!(video_id, "Oracle response has no clips");
        return Reconstructed::failed(
            video_id,
            DebugData::error("empty parsed response").with_response(response),
        );
    }

    let by_index: BTreeMap<usize, Option<&str>> = parsed
        .iter()
        .map(|clip| (clip.index, clip.caption.as_deref()))
        .collect();

    let mut captions = BTreeMap::new();
    let mut failed = Vec::new();
    for &index in mask {
        match by_index.get(&index) {
            Some(Some(caption)) => {
                captions.insert(index, caption.to_string());
            }
            _ => {
                failed.push(index);
                captions.insert(index, String::new());
            }
        }
    }

    let mut changed_unmasked = Vec::new();
    for (&index, caption) in &by_index {
        if mask.contains(&index) {
            continue;
        }
        match video.clip(index) {
            // Clips without a ground-truth caption have nothing to alter.
            Some(clip) => {
                if let (Some(given), Some(original)) = (*caption, clip.caption())
                    && given != original
                {
                    changed_unmasked.push(index);
                }
            }
            None => debug!(video_id, index, "Ignoring out-of-range index in oracle response"),
        }
    }

    if !failed.is_empty() {
        warn!(video_id, ?failed, "Oracle left masked clips unreconstructed");
    }
    if !changed_unmasked.is_empty() {
        warn!(video_id, ?changed_unmasked, "Oracle altered unmasked captions");
    }

    info!(
        video_id,
        masked = mask.len(),
        ok = mask.len() - failed.len(),
        failed = failed.len(),
        "Reconciled oracle response"
    );

    let reconstructed = Reconstructed::new(video_id, captions);
    if failed.is_empty() && changed_unmasked.is_empty() {
        reconstructed
    } else {
        reconstructed.with_debug(
            DebugData {
                failed,
                changed_unmasked,
                ..DebugData::default()
            }
            .with_response(response),
        )
    }
}
