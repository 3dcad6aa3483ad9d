//! TTL document cache
//!
//! Parsing a workbook and building its index is the expensive half of every
//! request, so built catalogs are cached by document fingerprint and served
//! until their TTL lapses. Time is read through the [`Clock`] trait; tests
//! swap in a [`ManualClock`] and step it instead of sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Time source for cache expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Step the clock forward
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock()
    }
}

/// Cache tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a cached document stays valid after insertion
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
        }
    }
}

/// Counter snapshot for observability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct CacheEntry<T> {
    value: Arc<T>,
    inserted_at: Instant,
}

/// Keyed TTL cache handing out shared references to built values
pub struct DocumentCache<T> {
    entries: RwLock<AHashMap<String, CacheEntry<T>>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<T> DocumentCache<T> {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(AHashMap::new()),
            config,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Fetch a live entry; an expired one is evicted on the way out
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if self.is_live(entry, now) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(Arc::clone(&entry.value));
                }
                Some(_) => {}
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }

        // Expired under the read lock. A concurrent put may have refreshed
        // the entry between the two locks, so re-check before evicting.
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(key) {
            if self.is_live(entry, now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(&entry.value));
            }
            entries.remove(key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(key, "evicted expired cache entry");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert a value and hand back the shared reference
    pub fn put(&self, key: impl Into<String>, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            inserted_at: self.clock.now(),
        };
        self.entries.write().insert(key.into(), entry);
        value
    }

    /// Drop one entry; true when something was actually removed
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Drop everything, returning how many entries were held
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        count
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.read().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn is_live(&self, entry: &CacheEntry<T>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) <= self.config.ttl
    }
}
