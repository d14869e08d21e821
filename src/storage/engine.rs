//! Thread-Safe TTL Cache
//!
//! This module implements the cache that sits in front of the anagram
//! provider. Each entry remembers when its value was fetched; an entry is
//! served only while `now - fetched_at < ttl`.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Keys are spread over independent shards so lookups
//!    and stores on different keys rarely touch the same lock.
//! 2. **Lazy Expiry**: Staleness is decided on read. A stale entry stays in
//!    place until it is overwritten, evicted, or purged by the sweeper.
//! 3. **Bounded Shards**: Each shard holds at most `ceil(max_entries / shards)`
//!    entries. A full shard drops its stale entries first, then its oldest one.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TtlCache                             │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `lookup` holds one shard's read lock for the duration of a single key
//! check; `store` holds one shard's write lock for a single insert. A reader
//! therefore never observes a half-written entry, and concurrent stores to
//! the same key are linearized by the shard lock (the later store wins).

use crate::config::CacheConfig;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// A cached value together with the time it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,
    /// When the value was fetched from the provider
    pub fetched_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, fetched_at: Instant) -> Self {
        Self { value, fetched_at }
    }

    /// Returns true if the entry is still servable at `now`.
    #[inline]
    pub fn is_fresh_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Result of a cache lookup.
///
/// `Expired` is reported separately from `Miss` for logging and stats;
/// callers must treat both the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// The key is present and fresh
    Hit(V),
    /// The key is not present
    Miss,
    /// The key is present but stale
    Expired,
}

impl<V> Lookup<V> {
    /// Short label for logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Lookup::Hit(_) => "hit",
            Lookup::Miss => "miss",
            Lookup::Expired => "expired",
        }
    }

    /// Returns the value on a hit.
    pub fn into_hit(self) -> Option<V> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Expired => None,
        }
    }
}

/// A point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub stores: u64,
    pub evictions: u64,
    pub purged: u64,
}

impl CacheStats {
    /// Fraction of lookups that were served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.expired;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A single shard holding a portion of the keys.
#[derive(Debug)]
struct Shard<V> {
    data: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> Shard<V> {
    fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave a torn entry behind:
    // inserts and removals are single HashMap calls.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A sharded, time-bounded cache keyed by string.
///
/// # Thread Safety
///
/// Designed to be wrapped in an `Arc` and shared by every connection task.
/// All operations take `&self`.
///
/// # Example
///
/// ```
/// use anagramd::storage::{Lookup, TtlCache};
/// use std::time::{Duration, Instant};
///
/// let cache = TtlCache::with_ttl(Duration::from_secs(10));
/// let now = Instant::now();
///
/// cache.store("listen", "silent", now);
/// assert_eq!(cache.lookup_at("listen", now), Lookup::Hit("silent"));
/// assert_eq!(cache.lookup_at("listen", now + Duration::from_secs(10)), Lookup::Expired);
/// assert_eq!(cache.lookup_at("stop", now), Lookup::Miss);
/// ```
pub struct TtlCache<V> {
    shards: Vec<Shard<V>>,
    ttl: Duration,
    shard_capacity: usize,

    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    stores: AtomicU64,
    evictions: AtomicU64,
    purged: AtomicU64,
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("shards", &self.shards.len())
            .field("ttl", &self.ttl)
            .field("shard_capacity", &self.shard_capacity)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<V: Clone> TtlCache<V> {
    /// Creates a cache from the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        let shard_count = config.shards.max(1);
        let shard_capacity = config.max_entries.div_ceil(shard_count).max(1);
        let shards = (0..shard_count).map(|_| Shard::new()).collect();

        Self {
            shards,
            ttl: config.ttl,
            shard_capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
            stores: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            purged: AtomicU64::new(0),
        }
    }

    /// Creates a cache with the default capacity and the given TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(CacheConfig {
            ttl,
            ..CacheConfig::default()
        })
    }

    /// The time-to-live applied to every entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[inline]
    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    #[inline]
    fn get_shard(&self, key: &str) -> &Shard<V> {
        &self.shards[self.shard_index(key)]
    }

    /// Looks up `key` against the current time.
    pub fn lookup(&self, key: &str) -> Lookup<V> {
        self.lookup_at(key, Instant::now())
    }

    /// Looks up `key` as of `now`.
    ///
    /// Returns `Hit` iff the key is present and `now - fetched_at < ttl`.
    pub fn lookup_at(&self, key: &str, now: Instant) -> Lookup<V> {
        let data = self.get_shard(key).read();

        match data.get(key) {
            Some(entry) if entry.is_fresh_at(now, self.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Lookup::Hit(entry.value.clone())
            }
            Some(_) => {
                self.expired.fetch_add(1, Ordering::Relaxed);
                Lookup::Expired
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Lookup::Miss
            }
        }
    }

    /// Stores `value` under `key`, fetched at `now`.
    ///
    /// Any existing entry for the key is overwritten unconditionally.
    /// Returns `true` if the key was not present before.
    pub fn store(&self, key: impl Into<String>, value: V, now: Instant) -> bool {
        let key = key.into();
        self.stores.fetch_add(1, Ordering::Relaxed);

        let mut data = self.get_shard(&key).write();

        let is_new = !data.contains_key(&key);
        if is_new && data.len() >= self.shard_capacity {
            self.make_room(&mut data, now);
        }
        data.insert(key, CacheEntry::new(value, now));

        is_new
    }

    /// Frees at least one slot in a full shard.
    fn make_room(&self, data: &mut HashMap<String, CacheEntry<V>>, now: Instant) {
        let before = data.len();
        data.retain(|_, entry| entry.is_fresh_at(now, self.ttl));
        let purged = (before - data.len()) as u64;
        if purged > 0 {
            self.purged.fetch_add(purged, Ordering::Relaxed);
        }

        if data.len() >= self.shard_capacity {
            let oldest = data
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(key, _)| key.clone());

            if let Some(key) = oldest {
                data.remove(&key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Removes every stale entry. Returns the number removed.
    pub fn purge_expired(&self) -> u64 {
        self.purge_expired_at(Instant::now())
    }

    /// Removes every entry that is stale as of `now`.
    pub fn purge_expired_at(&self, now: Instant) -> u64 {
        let mut cleaned = 0u64;

        for shard in &self.shards {
            let mut data = shard.write();
            let before = data.len();

            data.retain(|_, entry| entry.is_fresh_at(now, self.ttl));

            cleaned += (before - data.len()) as u64;
        }

        if cleaned > 0 {
            self.purged.fetch_add(cleaned, Ordering::Relaxed);
        }

        cleaned
    }

    /// Returns the number of entries, fresh or stale.
    pub fn len(&self) -> u64 {
        self.shards.iter().map(|s| s.read().len() as u64).sum()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.read().is_empty())
    }

    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const TTL: Duration = Duration::from_millis(10_000);

    fn cache() -> TtlCache<String> {
        TtlCache::with_ttl(TTL)
    }

    #[test]
    fn test_store_and_hit() {
        let cache = cache();
        let now = Instant::now();

        assert!(cache.store("listen", "silent".to_string(), now));
        assert_eq!(
            cache.lookup_at("listen", now),
            Lookup::Hit("silent".to_string())
        );
    }

    #[test]
    fn test_lookup_nonexistent() {
        let cache = cache();
        assert_eq!(cache.lookup("nothing"), Lookup::Miss);
    }

    #[test]
    fn test_ttl_boundary() {
        let cache = cache();
        let now = Instant::now();
        cache.store("listen", "silent".to_string(), now);

        // Fresh right up to the boundary
        let just_before = now + TTL - Duration::from_millis(1);
        assert!(matches!(cache.lookup_at("listen", just_before), Lookup::Hit(_)));

        // Stale at exactly fetched_at + ttl
        assert_eq!(cache.lookup_at("listen", now + TTL), Lookup::Expired);
        assert_eq!(
            cache.lookup_at("listen", now + TTL * 2),
            Lookup::Expired
        );
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let cache = cache();
        let now = Instant::now();
        cache.store("Listen", "a".to_string(), now);

        assert_eq!(cache.lookup_at("listen", now), Lookup::Miss);
        assert!(matches!(cache.lookup_at("Listen", now), Lookup::Hit(_)));
    }

    #[test]
    fn test_store_overwrites() {
        let cache = cache();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(8);

        assert!(cache.store("listen", "first".to_string(), t0));
        assert!(!cache.store("listen", "second".to_string(), t1));

        assert_eq!(cache.len(), 1);
        // The second store refreshed the timestamp as well as the value
        assert_eq!(
            cache.lookup_at("listen", t0 + TTL + Duration::from_secs(1)),
            Lookup::Hit("second".to_string())
        );
    }

    #[test]
    fn test_store_refreshes_expired_entry() {
        let cache = cache();
        let t0 = Instant::now();
        cache.store("listen", "old".to_string(), t0);

        let later = t0 + TTL;
        assert_eq!(cache.lookup_at("listen", later), Lookup::Expired);

        cache.store("listen", "new".to_string(), later);
        assert_eq!(
            cache.lookup_at("listen", later),
            Lookup::Hit("new".to_string())
        );
    }

    #[test]
    fn test_empty_value_is_cached() {
        let cache: TtlCache<Vec<String>> = TtlCache::with_ttl(TTL);
        let now = Instant::now();
        cache.store("xyzzy", Vec::new(), now);

        assert_eq!(cache.lookup_at("xyzzy", now), Lookup::Hit(Vec::new()));
    }

    #[test]
    fn test_stats_counts_outcomes() {
        let cache = cache();
        let now = Instant::now();
        cache.store("a", "1".to_string(), now);

        cache.lookup_at("a", now);
        cache.lookup_at("a", now + TTL);
        cache.lookup_at("b", now);

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.stores, 1);
        assert!((stats.hit_rate() - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache: TtlCache<u32> = TtlCache::new(CacheConfig {
            ttl: TTL,
            max_entries: 2,
            shards: 1,
        });
        let t0 = Instant::now();

        cache.store("a", 1, t0);
        cache.store("b", 2, t0 + Duration::from_millis(1));
        cache.store("c", 3, t0 + Duration::from_millis(2));

        let now = t0 + Duration::from_millis(3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.lookup_at("a", now), Lookup::Miss);
        assert_eq!(cache.lookup_at("b", now), Lookup::Hit(2));
        assert_eq!(cache.lookup_at("c", now), Lookup::Hit(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_capacity_prefers_dropping_stale_entries() {
        let cache: TtlCache<u32> = TtlCache::new(CacheConfig {
            ttl: TTL,
            max_entries: 2,
            shards: 1,
        });
        let t0 = Instant::now();

        cache.store("stale", 1, t0);
        cache.store("fresh", 2, t0 + TTL);
        cache.store("newest", 3, t0 + TTL + Duration::from_millis(1));

        let now = t0 + TTL + Duration::from_millis(2);
        assert_eq!(cache.lookup_at("stale", now), Lookup::Miss);
        assert_eq!(cache.lookup_at("fresh", now), Lookup::Hit(2));
        assert_eq!(cache.lookup_at("newest", now), Lookup::Hit(3));

        let stats = cache.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.purged, 1);
    }

    #[test]
    fn test_overwrite_in_full_shard_does_not_evict() {
        let cache: TtlCache<u32> = TtlCache::new(CacheConfig {
            ttl: TTL,
            max_entries: 1,
            shards: 1,
        });
        let now = Instant::now();

        cache.store("a", 1, now);
        cache.store("a", 2, now);

        assert_eq!(cache.lookup_at("a", now), Lookup::Hit(2));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_purge_expired() {
        let cache = cache();
        let t0 = Instant::now();

        for i in 0..10 {
            cache.store(format!("old{}", i), "v".to_string(), t0);
        }
        cache.store("new", "v".to_string(), t0 + TTL);

        assert_eq!(cache.purge_expired_at(t0 + TTL), 10);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().purged, 10);
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let cache: Arc<TtlCache<String>> = Arc::new(cache());
        let mut handles = vec![];

        for i in 0..10 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("key_{}_{}", i, j);
                    cache.store(key.clone(), key.clone(), Instant::now());
                    assert_eq!(cache.lookup(&key), Lookup::Hit(key));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 1000);
    }

    #[test]
    fn test_concurrent_writers_same_key() {
        use std::thread;

        let cache: Arc<TtlCache<String>> = Arc::new(cache());
        let mut handles = vec![];

        for i in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for _ in 0..200 {
                    cache.store("shared", format!("writer{}", i), Instant::now());
                    match cache.lookup("shared") {
                        Lookup::Hit(value) => assert!(value.starts_with("writer")),
                        other => panic!("unexpected lookup: {:?}", other),
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 1);
    }
}
