use rkyv::{Archive, Deserialize, Serialize};

/// Oracle response persisted to disk.
///
/// Stored as `rkyv` bytes, one file per key.
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct CachedResponse {
    /// Full 32-byte request key.
    pub key: [u8; 32],
    /// Model identity the response came from.
    pub model: String,
    /// Unix timestamp when cached.
    pub created_at: i64,
    /// Raw response text.
    pub response: String,
}

/// Where a lookup was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    HitMemory,
    HitDisk,
    Miss,
}

impl CacheStatus {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::HitMemory => "HIT_MEMORY",
            CacheStatus::HitDisk => "HIT_DISK",
            CacheStatus::Miss => "MISS",
        }
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counters reported at the end of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub disk_hits: u64,
    pub misses: u64,
    pub stores: u64,
}

impl CacheStats {
    pub fn lookups(&self) -> u64 {
        self.memory_hits + self.disk_hits + self.misses
    }
}
