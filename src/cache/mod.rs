//! Persistent oracle response cache.
//!
//! Two tiers keyed by the same 32-byte request hash:
//! - an in-memory [`MemoryCache`] (moka, LRU) answering repeated prompts
//!   within a process;
//! - a [`DiskStore`] that survives restarts so identical prompts are never
//!   re-sent across batches.
//!
//! Disk hits are promoted into memory. The cache is an explicit handle owned
//! by the batch orchestrator and injected into the oracle client; there is no
//! process-wide instance.

pub mod disk;
pub mod error;
pub mod l1;
pub mod types;

#[cfg(test)]
mod tests;

pub use disk::DiskStore;
pub use error::{CacheError, CacheResult};
pub use l1::MemoryCache;
pub use types::{CacheStats, CacheStatus, CachedResponse};

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

/// Two-tier response cache.
#[derive(Debug)]
pub struct ResponseCache {
    memory: MemoryCache,
    disk: Option<DiskStore>,
    memory_hits: AtomicU64,
    disk_hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
}

impl ResponseCache {
    /// Creates a cache persisted under `dir`.
    pub fn open(dir: PathBuf, memory_capacity: u64) -> CacheResult<Self> {
        let disk = DiskStore::new(dir);
        disk.ensure_root()?;
        info!(
            root = %disk.root().display(),
            entries = disk.entry_count()?,
            "Opened oracle response cache"
        );
        Ok(Self::with_parts(MemoryCache::with_capacity(memory_capacity), Some(disk)))
    }

    /// Creates a memory-only cache (nothing persisted).
    pub fn in_memory(memory_capacity: u64) -> Self {
        Self::with_parts(MemoryCache::with_capacity(memory_capacity), None)
    }

    fn with_parts(memory: MemoryCache, disk: Option<DiskStore>) -> Self {
        Self {
            memory,
            disk,
            memory_hits: AtomicU64::new(0),
            disk_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stores: AtomicU64::new(0),
        }
    }

    pub fn disk(&self) -> Option<&DiskStore> {
        self.disk.as_ref()
    }

    /// Looks up `key` in memory, then on disk.
    ///
    /// Disk read failures are logged and reported as a miss.
    pub fn lookup(&self, key: &[u8; 32]) -> (Option<Arc<str>>, CacheStatus) {
        if let Some(response) = self.memory.get(key) {
            self.memory_hits.fetch_add(1, Ordering::Relaxed);
            return (Some(response), CacheStatus::HitMemory);
        }

        if let Some(disk) = &self.disk {
            match disk.load(key) {
                Ok(Some(entry)) => {
                    let response: Arc<str> = Arc::from(entry.response);
                    self.memory.insert(*key, Arc::clone(&response));
                    self.disk_hits.fetch_add(1, Ordering::Relaxed);
                    return (Some(response), CacheStatus::HitDisk);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Failed to read cached response; treating as miss"),
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        (None, CacheStatus::Miss)
    }

    /// Stores a response in both tiers.
    pub fn store(&self, key: [u8; 32], model: &str, response: &str) -> CacheResult<()> {
        self.memory.insert(key, Arc::from(response));
        if let Some(disk) = &self.disk {
            disk.store(&CachedResponse {
                key,
                model: model.to_string(),
                created_at: chrono::Utc::now().timestamp(),
                response: response.to_string(),
            })?;
        }
        self.stores.fetch_add(1, Ordering::Relaxed);
        debug!(model, bytes = response.len(), "Cached oracle response");
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
        }
    }
}
