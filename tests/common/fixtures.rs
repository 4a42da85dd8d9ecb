//! Test fixtures for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use recon::MockOracle;
use recon::oracle::{OracleError, OracleRequest};
use recon::sequence::Video;

pub const PROMPT_SEPARATOR: &str = recon::constants::PROMPT_SEPARATOR;

pub const FILLER_CAPTION: &str = "The person holds the red book.";

/// Videos of varying lengths built from numbered captions.
pub fn numbered_video(video_id: &str, len: usize) -> Video {
    Video::from_captions(
        video_id,
        (0..len).map(|i| Some(format!("Clip {i} shows the person with the book."))),
    )
}

/// Extracts the JSON-array clip payload of a prompt.
pub fn prompt_clips(request: &OracleRequest) -> Vec<serde_json::Value> {
    request
        .prompt
        .split_once(PROMPT_SEPARATOR)
        .and_then(|(_, payload)| serde_json::from_str(payload).ok())
        .unwrap_or_default()
}

/// Answers every prompt with all clips, filling masked captions with
/// [`FILLER_CAPTION`].
pub fn filling_oracle() -> Arc<MockOracle> {
    Arc::new(MockOracle::from_fn(|request| Ok(fill(request, |_| true))))
}

/// Like [`filling_oracle`] but leaves out the first masked clip.
pub fn forgetful_oracle() -> Arc<MockOracle> {
    Arc::new(MockOracle::from_fn(|request| {
        let first_masked = prompt_clips(request)
            .iter()
            .find(|clip| clip["caption"].is_null())
            .and_then(|clip| clip["index"].as_u64());
        Ok(fill(request, |index| Some(index) != first_masked))
    }))
}

/// Always rate-limited.
pub fn throttled_oracle() -> Arc<MockOracle> {
    Arc::new(MockOracle::from_fn(|_| {
        Err(OracleError::RateLimited("429 Too Many Requests".into()))
    }))
}

fn fill(request: &OracleRequest, keep: impl Fn(u64) -> bool) -> String {
    let clips: Vec<serde_json::Value> = prompt_clips(request)
        .into_iter()
        .filter(|clip| clip["index"].as_u64().is_some_and(&keep))
        .map(|clip| {
            let caption = clip["caption"].as_str().unwrap_or(FILLER_CAPTION).to_string();
            serde_json::json!({ "index": clip["index"], "caption": caption })
        })
        .collect();
    serde_json::to_string(&clips).unwrap_or_default()
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture file");
    path
}

pub const DATASET_JSON: &str = r#"[
    {"video_id": "kitchen", "clips": [
        {"start": 0.0, "duration": 2.0, "caption": "A man opens the fridge."},
        {"start": 2.0, "duration": 2.0, "caption": "He takes out a carton of milk."},
        {"start": 4.0, "duration": 2.0, "caption": "He pours the milk into a glass."},
        {"start": 6.0, "duration": 2.0, "caption": "He drinks the milk."}
    ]},
    {"video_id": "park", "clips": [
        {"start": 0.0, "duration": 3.0, "caption": "A dog runs across the grass."},
        {"start": 3.0, "duration": 3.0, "caption": "The dog catches a ball."},
        {"start": 6.0, "duration": 3.0, "caption": "The dog brings the ball back."}
    ]}
]"#;

/// The "gap" video lacks a ground-truth caption for clip 1.
pub const GAPPY_DATASET_JSON: &str = r#"[
    {"video_id": "gap", "clips": [
        {"start": 0.0, "duration": 2.0, "caption": "A man opens the fridge."},
        {"start": 2.0, "duration": 2.0, "caption": null},
        {"start": 4.0, "duration": 2.0, "caption": "He pours the milk into a glass."},
        {"start": 6.0, "duration": 2.0, "caption": "He drinks the milk."}
    ]},
    {"video_id": "park", "clips": [
        {"start": 0.0, "duration": 3.0, "caption": "A dog runs across the grass."},
        {"start": 3.0, "duration": 3.0, "caption": "The dog catches a ball."},
        {"start": 6.0, "duration": 3.0, "caption": "The dog brings the ball back."}
    ]}
]"#;
