//! Video loading.
//!
//! The on-disk format is a JSON array of videos:
//!
//! ```json
//! [{"video_id": "v1", "clips": [{"start": 0.0, "duration": 2.5, "caption": "..."}]}]
//! ```
//!
//! Clip indices are assigned by position. `timestamp` and `description` are
//! accepted as aliases of `start` and `caption`.

pub mod error;


pub use error::{DatasetError, DatasetResult};

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::sequence::{Clip, TimeRange, Video};

#[derive(Debug, Deserialize)]
struct RawVideo {
    video_id: String,
    clips: Vec<RawClip>,
}

#[derive(Debug, Deserialize)]
struct RawClip {
    #[serde(default, alias = "timestamp")]
    start: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default, alias = "description")]
    caption: Option<String>,
}

impl RawVideo {
    fn into_video(self) -> DatasetResult<Video> {
        let video_id = self.video_id;
        let clips = self
            .clips
            .into_iter()
            .enumerate()
            .map(|(position, raw)| {
                let start = raw.start.unwrap_or(position as f64);
                let time_range = TimeRange::new(start, raw.duration.unwrap_or(1.0)).map_err(
                    |source| DatasetError::InvalidClip {
                        video_id: video_id.clone(),
                        position,
                        source,
                    },
                )?;
                Ok(Clip::new(position, time_range, raw.caption))
            })
            .collect::<DatasetResult<Vec<_>>>()?;

        Video::new(video_id.clone(), clips).map_err(|source| DatasetError::InvalidClip {
            video_id,
            position: 0,
            source,
        })
    }
}

/// Parses videos from JSON text, keeping at most `limit`.
pub fn parse_videos(text: &str, path: &Path, limit: Option<usize>) -> DatasetResult<Vec<Video>> {
    let raw: Vec<RawVideo> = serde_json::from_str(text).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seen = HashSet::new();
    let mut videos = Vec::new();
    for raw in raw.into_iter().take(limit.unwrap_or(usize::MAX)) {
        if !seen.insert(raw.video_id.clone()) {
            return Err(DatasetError::DuplicateVideo(raw.video_id));
        }
        videos.push(raw.into_video()?);
    }
    Ok(videos)
}

/// Loads videos from a JSON dataset file.
pub fn load_videos(path: impl AsRef<Path>, limit: Option<usize>) -> DatasetResult<Vec<Video>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let videos = parse_videos(&text, path, limit)?;
    info!(path = %path.display(), videos = videos.len(), "Loaded dataset");
    Ok(videos)
}

const TOY_CAPTIONS: [&str; 10] = [
    "A person walks into a room from the left.",
    "The person approaches a table in the center.",
    "The person picks up a red book from the table.",
    "The person holds the book and looks at its cover.",
    "The person opens the book to the first page.",
    "The person turns a page in the book.",
    "The person closes the book.",
    "The person places the red book back on the table.",
    "The person turns around.",
    "The person walks out of the room to the left.",
];

/// Ten one-second clips of a person handling a red book.
pub fn toy_video() -> Video {
    Video::from_captions("toy", TOY_CAPTIONS.map(Some))
}

/// Every visible caption across `videos`, for IDF fitting.
pub fn corpus(videos: &[Video]) -> Vec<String> {
    videos
        .iter()
        .flat_map(|video| video.clips().iter().filter_map(|clip| clip.caption()))
        .map(str::to_string)
        .collect()
}
