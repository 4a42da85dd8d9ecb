//! On-disk response store (one `rkyv` file per key, sharded by key prefix).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;

use super::error::{CacheError, CacheResult};
use super::types::CachedResponse;
use crate::hashing::key_to_hex;

const RKYV_EXTENSION: &str = "rkyv";

const TEMP_EXTENSION: &str = "rkyv.tmp";

const RKYV_ALIGNMENT: usize = 16;

#[derive(Debug, Clone)]
/// Stores and retrieves [`CachedResponse`] records under a root directory.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensures the root directory exists.
    pub fn ensure_root(&self) -> CacheResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|_| CacheError::DirectoryUnavailable {
                path: self.root.clone(),
            })?;
        }
        Ok(())
    }

    fn shard_path(&self, hex: &str) -> PathBuf {
        self.root.join(&hex[..2])
    }

    fn entry_path(&self, key: &[u8; 32]) -> PathBuf {
        let hex = key_to_hex(key);
        self.shard_path(&hex)
            .join(format!("{}.{}", hex, RKYV_EXTENSION))
    }

    fn temp_entry_path(&self, key: &[u8; 32]) -> PathBuf {
        let hex = key_to_hex(key);
        self.shard_path(&hex)
            .join(format!("{}.{}", hex, TEMP_EXTENSION))
    }

    /// Writes `entry` atomically (temp file, fsync, rename).
    pub fn store(&self, entry: &CachedResponse) -> CacheResult<()> {
        self.ensure_root()?;
        let final_path = self.entry_path(&entry.key);
        if let Some(shard) = final_path.parent() {
            fs::create_dir_all(shard)?;
        }

        let bytes = rkyv::to_bytes::<RkyvError>(entry)
            .map_err(|e| CacheError::Serialization(format!("{:?}", e)))?;

        let temp_path = self.temp_entry_path(&entry.key);
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }

    /// Loads the entry for `key`, or `None` if it was never stored.
    pub fn load(&self, key: &[u8; 32]) -> CacheResult<Option<CachedResponse>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read(&path)?;
        let mut aligned = AlignedVec::<RKYV_ALIGNMENT>::with_capacity(raw.len());
        aligned.extend_from_slice(&raw);

        let entry = rkyv::from_bytes::<CachedResponse, RkyvError>(&aligned)
            .map_err(|e| CacheError::Serialization(format!("{:?}", e)))?;

        if entry.key != *key {
            return Err(CacheError::KeyMismatch { path });
        }
        Ok(Some(entry))
    }

    /// Counts stored entries by scanning the shard directories.
    pub fn entry_count(&self) -> CacheResult<usize> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut count = 0;
        for shard in fs::read_dir(&self.root)? {
            let shard = shard?.path();
            if !shard.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&shard)? {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == RKYV_EXTENSION) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}
