use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{StorageError, StorageResult};
use crate::reconstruction::Reconstructed;

/// Writes one JSON line per processed video.
#[derive(Debug)]
pub struct ArtifactWriter {
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl ArtifactWriter {
    /// Creates (or truncates) the artifact file at `path`.
    pub fn create(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| StorageError::io(&path, e))?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Appends `record` and flushes, so a crash loses at most the line in flight.
    pub fn write(&mut self, record: &Reconstructed) -> StorageResult<()> {
        let line = serde_json::to_string(record)?;
        self.out
            .write_all(line.as_bytes())
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush())
            .map_err(|e| StorageError::io(&self.path, e))?;
        self.written += 1;
        debug!(video_id = %record.video_id, path = %self.path.display(), "Wrote artifact record");
        Ok(())
    }
}

/// Reads a JSON-lines file, skipping blank lines.
pub(crate) fn read_json_lines<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let mut records = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| StorageError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| StorageError::Malformed {
            path: path.to_path_buf(),
            line: number + 1,
            reason: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Parses an artifact log back into reconstruction records.
pub fn read_artifacts(path: impl AsRef<Path>) -> StorageResult<Vec<Reconstructed>> {
    read_json_lines(path.as_ref())
}

/// Counts over one artifact log. Records without metrics are not scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub total: usize,
    pub scored: usize,
    pub skipped: usize,
    /// Records whose reconstruction failed structurally.
    pub failed: usize,
    /// Records carrying any debug data.
    pub with_debug: usize,
}

/// In-memory view of an artifact log for post-hoc inspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactLog {
    records: Vec<Reconstructed>,
}

impl ArtifactLog {
    pub fn load(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::from_records(read_artifacts(path)?))
    }

    pub fn from_records(records: Vec<Reconstructed>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Reconstructed] {
        &self.records
    }

    pub fn find(&self, video_id: &str) -> Option<&Reconstructed> {
        self.records.iter().find(|r| r.video_id == video_id)
    }

    pub fn summary(&self) -> ArtifactSummary {
        self.records
            .iter()
            .fold(ArtifactSummary::default(), |mut summary, record| {
                summary.total += 1;
                if record.is_scored() {
                    summary.scored += 1;
                }
                if record.is_skipped() {
                    summary.skipped += 1;
                }
                if record.is_failed() {
                    summary.failed += 1;
                }
                if record.debug_data.is_some() {
                    summary.with_debug += 1;
                }
                summary
            })
    }
}
