//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with lazy TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, EntryMetadata};

// == Cache Store ==
/// In-memory key-value store with TTL expiration.
///
/// Values are type-erased JSON; at most one entry exists per key (last write
/// wins). Expiration is checked lazily on read, with `sweep_expired` as the
/// explicit reclaim path for keys that are written but never read again.
///
/// None of the operations can fail: unknown keys read as absent, and
/// `invalidate` on an absent key is a no-op.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Default TTL applied when `set` is called without one; None = no expiration
    default_ttl: Option<Duration>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given default TTL.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied to entries stored without an explicit
    ///   TTL; None means such entries never expire
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the value is overwritten and TTL is reset.
    /// The value is stored as-is; the cache never inspects or transforms it.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (falls back to the default TTL if None)
    pub fn set(&mut self, key: String, value: Value, ttl: Option<Duration>) {
        let effective_ttl = ttl.or(self.default_ttl);

        let entry = CacheEntry::new(value, effective_ttl);
        self.entries.insert(key, entry);

        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired. Expired entries are
    /// removed on access and counted as misses.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    pub fn get(&mut self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                // Evict lazily
                self.entries.remove(key);
                self.stats.set_total_entries(self.entries.len());
                self.stats.record_expiration();
                self.stats.record_miss();
                return None;
            }

            let value = entry.value.clone();
            self.stats.record_hit();
            Some(value)
        } else {
            self.stats.record_miss();
            None
        }
    }

    // == Has ==
    /// Returns true if a live (non-expired) entry exists for the key.
    ///
    /// Unlike `get`, this neither evicts expired entries nor touches the
    /// hit/miss counters.
    pub fn has(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    // == Invalidate ==
    /// Removes an entry by key unconditionally.
    ///
    /// Idempotent: invalidating an absent key is a no-op. Returns whether an
    /// entry was actually removed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Clear ==
    /// Removes all entries, e.g. on logout.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Inspect ==
    /// Returns diagnostic metadata for a key's entry, if one exists.
    ///
    /// Expired-but-unswept entries are reported too; `ttl_remaining` reads
    /// as zero for them.
    pub fn inspect(&self, key: &str) -> Option<EntryMetadata> {
        self.entries.get(key).map(CacheEntry::metadata)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Sweep Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.stats.record_expiration();
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    fn store() -> CacheStore {
        CacheStore::new(Some(Duration::from_secs(300)))
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store();

        store.set("movie:1".to_string(), json!({"title": "A"}), None);
        let value = store.get("movie:1").unwrap();

        assert_eq!(value, json!({"title": "A"}));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store();

        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_has() {
        let mut store = store();

        store.set("movie:1".to_string(), json!("v"), None);
        assert!(store.has("movie:1"));
        assert!(!store.has("movie:2"));

        // has must not count as a hit or miss
        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_store_has_expired_entry() {
        let mut store = store();

        store.set("k".to_string(), json!("v"), Some(Duration::from_millis(30)));
        sleep(Duration::from_millis(60));

        // Expired entries read as absent, even before a sweep
        assert!(!store.has("k"));
        assert_eq!(store.len(), 1, "has must not evict");
    }

    #[test]
    fn test_store_invalidate() {
        let mut store = store();

        store.set("movie:1".to_string(), json!("v"), None);
        assert!(store.invalidate("movie:1"));

        assert!(store.is_empty());
        assert!(store.get("movie:1").is_none());
    }

    #[test]
    fn test_store_invalidate_nonexistent_is_noop() {
        let mut store = store();

        assert!(!store.invalidate("nonexistent"));
        assert!(!store.invalidate("nonexistent"));
    }

    #[test]
    fn test_store_clear() {
        let mut store = store();

        store.set("movie:1".to_string(), json!("a"), None);
        store.set("list:1".to_string(), json!(["a"]), None);
        store.clear();

        assert!(store.is_empty());
        assert!(store.get("movie:1").is_none());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store();

        store.set("movie:1".to_string(), json!("v1"), None);
        store.set("movie:1".to_string(), json!("v2"), None);

        assert_eq!(store.get("movie:1").unwrap(), json!("v2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store();

        store.set("k".to_string(), json!("v"), Some(Duration::from_millis(50)));

        // Should be accessible immediately
        assert!(store.get("k").is_some());

        // Wait for expiration
        sleep(Duration::from_millis(80));

        // Should be expired now, and evicted on access
        assert!(store.get("k").is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_no_default_ttl_never_expires() {
        let mut store = CacheStore::new(None);

        store.set("k".to_string(), json!("v"), None);
        assert!(store.inspect("k").unwrap().expires_at.is_none());
    }

    #[test]
    fn test_store_explicit_ttl_overrides_default() {
        let mut store = CacheStore::new(None);

        store.set("k".to_string(), json!("v"), Some(Duration::from_secs(60)));
        assert!(store.inspect("k").unwrap().expires_at.is_some());
    }

    #[test]
    fn test_store_stats() {
        let mut store = store();

        store.set("k".to_string(), json!("v"), None);
        store.get("k"); // hit
        store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_sweep_expired() {
        let mut store = store();

        store.set("short".to_string(), json!("v"), Some(Duration::from_millis(30)));
        store.set("long".to_string(), json!("v"), Some(Duration::from_secs(10)));

        // Wait for the short entry to expire
        sleep(Duration::from_millis(60));

        let removed = store.sweep_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("long").is_some());

        let stats = store.stats();
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_store_movie_scenario() {
        let mut store = store();

        store.set(
            "movie_42".to_string(),
            json!({"title": "X"}),
            Some(Duration::from_millis(60)),
        );
        assert_eq!(store.get("movie_42").unwrap(), json!({"title": "X"}));

        // Simulate the TTL elapsing
        sleep(Duration::from_millis(70));
        assert!(store.get("movie_42").is_none());
    }
}
