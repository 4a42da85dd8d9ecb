use super::*;
use crate::hashing::hash_prompt;
use tempfile::TempDir;

fn create_test_cache() -> (ResponseCache, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let cache = ResponseCache::open(dir.path().join("oracle"), 100).expect("open cache");
    (cache, dir)
}

#[test]
fn test_lookup_miss_then_memory_hit() {
    let (cache, _dir) = create_test_cache();
    let key = hash_prompt("prompt one");

    let (response, status) = cache.lookup(&key);
    assert!(response.is_none());
    assert_eq!(status, CacheStatus::Miss);

    cache.store(key, "model-a", "[]").expect("store");

    let (response, status) = cache.lookup(&key);
    assert_eq!(response.as_deref(), Some("[]"));
    assert_eq!(status, CacheStatus::HitMemory);
}

#[test]
fn test_disk_survives_new_instance() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let key = hash_prompt("persisted prompt");

    {
        let cache = ResponseCache::open(dir.path().to_path_buf(), 10).expect("open");
        cache.store(key, "model-a", "response text").expect("store");
    }

    let reopened = ResponseCache::open(dir.path().to_path_buf(), 10).expect("reopen");
    let (response, status) = reopened.lookup(&key);
    assert_eq!(response.as_deref(), Some("response text"));
    assert_eq!(status, CacheStatus::HitDisk);

    let (_, status) = reopened.lookup(&key);
    assert_eq!(status, CacheStatus::HitMemory);
}

#[test]
fn test_stats_count_each_tier() {
    let (cache, _dir) = create_test_cache();
    let key = hash_prompt("p");

    cache.lookup(&key);
    cache.store(key, "m", "r").unwrap();
    cache.lookup(&key);
    cache.lookup(&key);

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.memory_hits, 2);
    assert_eq!(stats.disk_hits, 0);
    assert_eq!(stats.stores, 1);
    assert_eq!(stats.lookups(), 3);
}

#[test]
fn test_in_memory_cache_does_not_touch_disk() {
    let cache = ResponseCache::in_memory(10);
    let key = hash_prompt("p");

    cache.store(key, "m", "r").unwrap();

    assert!(cache.disk().is_none());
    assert_eq!(cache.lookup(&key).1, CacheStatus::HitMemory);
}

#[test]
fn test_disk_store_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = DiskStore::new(dir.path().to_path_buf());
    let entry = CachedResponse {
        key: hash_prompt("k"),
        model: "model-b".to_string(),
        created_at: 1_760_000_000,
        response: "{\"clips\": []}".to_string(),
    };

    assert_eq!(store.entry_count().unwrap(), 0);
    assert_eq!(store.load(&entry.key).unwrap(), None);

    store.store(&entry).expect("store");
    assert_eq!(store.entry_count().unwrap(), 1);
    assert_eq!(store.load(&entry.key).unwrap(), Some(entry.clone()));
}

#[test]
fn test_disk_store_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let store = DiskStore::new(dir.path().to_path_buf());
    let key = hash_prompt("k");

    store
        .store(&CachedResponse {
            key,
            model: "m".into(),
            created_at: 0,
            response: "r".into(),
        })
        .unwrap();

    let shard = std::fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
    let names: Vec<String> = std::fs::read_dir(shard.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(".rkyv"));
}

#[test]
fn test_corrupt_entry_is_a_miss() {
    let (cache, _dir) = create_test_cache();
    let key = hash_prompt("corrupt");
    cache.store(key, "m", "r").unwrap();

    let disk = cache.disk().unwrap().clone();
    let fresh = ResponseCache::open(disk.root().to_path_buf(), 10).unwrap();
    let hex = crate::hashing::key_to_hex(&key);
    let path = disk.root().join(&hex[..2]).join(format!("{hex}.rkyv"));
    std::fs::write(&path, b"not rkyv").unwrap();

    let (response, status) = fresh.lookup(&key);
    assert!(response.is_none());
    assert_eq!(status, CacheStatus::Miss);
}

#[test]
fn test_memory_cache_basic_ops() {
    let memory = MemoryCache::with_capacity(4);
    let key = hash_prompt("x");

    assert!(memory.get(&key).is_none());
    memory.insert(key, std::sync::Arc::from("y"));
    assert_eq!(memory.get(&key).as_deref(), Some("y"));
    memory.insert(key, std::sync::Arc::from("z"));
    assert_eq!(memory.get(&key).as_deref(), Some("z"));
}

#[test]
fn test_cache_status_display() {
    assert_eq!(CacheStatus::HitDisk.to_string(), "HIT_DISK");
    assert_eq!(CacheStatus::Miss.to_string(), "MISS");
}
