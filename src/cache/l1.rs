//! In-memory front of the response cache.

use std::sync::Arc;

use moka::sync::Cache;

/// Exact-match map from request key to response text (LRU eviction).
pub struct MemoryCache {
    entries: Cache<[u8; 32], Arc<str>>,
}

impl MemoryCache {
    #[inline]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    #[inline]
    pub fn get(&self, key: &[u8; 32]) -> Option<Arc<str>> {
        self.entries.get(key)
    }

    #[inline]
    pub fn insert(&self, key: [u8; 32], response: Arc<str>) {
        self.entries.insert(key, response);
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}
