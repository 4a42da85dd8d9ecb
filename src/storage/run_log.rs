use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::artifact::read_json_lines;
use super::error::{StorageError, StorageResult};
use crate::runner::RunSummary;

/// One (strategy x masking) run as tracked in the batch run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub run_name: String,
    pub batch_name: String,
    pub strategy: serde_json::Value,
    pub masking: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub artifact_path: PathBuf,
    pub summary: RunSummary,
}

/// Append-only JSON-lines log of runs.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &RunRecord) -> StorageResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.sync_data())
            .map_err(|e| StorageError::io(&self.path, e))?;

        info!(run_id = %record.run_id, run_name = %record.run_name, "Recorded run");
        Ok(())
    }

    /// All recorded runs; a missing log reads as empty.
    pub fn read(&self) -> StorageResult<Vec<RunRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_json_lines(&self.path)
    }
}
