use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::debug;

use crate::traits::BlobCache;

/// Default number of entries held by [`InMemoryCache::new`].
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Hit and miss counters of an [`InMemoryCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Bounded in-memory LRU cache with per-entry expiry.
///
/// Intended for tests and single-process embedding. When full, the least
/// recently used entry is evicted.
pub struct InMemoryCache {
    entries: Mutex<LruCache<String, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryCache {
    /// Create a cache holding up to [`DEFAULT_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_capacity(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Number of entries currently held, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.entries.lock().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("lock poisoned");
        let now = Instant::now();

        let found = match entries
            .get(key)
            .map(|entry| (entry.is_expired(now), entry.value.clone()))
        {
            Some((true, _)) => {
                entries.pop(key);
                debug!(key, "cache entry expired");
                None
            }
            Some((false, value)) => Some(value),
            None => None,
        };

        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        self.entries.lock().expect("lock poisoned").put(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    fn delete(&self, key: &str) {
        self.entries.lock().expect("lock poisoned").pop(key);
    }
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("entries", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

/// A cache that never stores anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCache;

impl BlobCache for NullCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) {}

    fn delete(&self, _key: &str) {}
}
