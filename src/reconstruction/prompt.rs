use serde::{Deserialize, Serialize};

use crate::constants::{MISSING_PLACEHOLDER, PROMPT_SEPARATOR};
use crate::sequence::{Clip, Video};

/// Text layout of the clip sequence inside a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptFormat {
    /// One JSON array of clip objects.
    #[default]
    JsonArray,
    /// One JSON clip object per line.
    JsonLines,
}

impl PromptFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptFormat::JsonArray => "json_array",
            PromptFormat::JsonLines => "json_lines",
        }
    }
}

#[derive(Serialize)]
struct ClipPayload<'a> {
    index: usize,
    start: f64,
    duration: f64,
    caption: Option<&'a str>,
}

impl<'a> From<&'a Clip> for ClipPayload<'a> {
    fn from(clip: &'a Clip) -> Self {
        Self {
            index: clip.index(),
            start: clip.time_range().start(),
            duration: clip.time_range().duration(),
            caption: clip.caption(),
        }
    }
}

/// Serializes the clip sequence; masked captions become `null`.
pub fn format_clips(video: &Video, format: PromptFormat) -> Result<String, serde_json::Error> {
    let payload: Vec<ClipPayload<'_>> = video.clips().iter().map(ClipPayload::from).collect();
    match format {
        PromptFormat::JsonArray => serde_json::to_string_pretty(&payload),
        PromptFormat::JsonLines => {
            let lines = payload
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines.join("\n"))
        }
    }
}

/// Instruction, separator, then the serialized clips.
///
/// `{MISSING}` in the instruction names the marker used for masked captions.
pub fn build_prompt(
    instruction: &str,
    video: &Video,
    format: PromptFormat,
) -> Result<String, serde_json::Error> {
    let instruction = instruction.replace(MISSING_PLACEHOLDER, "null");
    let payload = format_clips(video, format)?;
    Ok(format!("{}{}{}", instruction.trim_end(), PROMPT_SEPARATOR, payload))
}
