//! Bounded in-memory TTL cache for HoYoLab API responses
//!
//! The cache is capacity-limited so a long-lived process issuing many
//! distinct parameterized requests cannot grow without bound. Capacity is
//! derived once at construction from total system memory (20% of it at a
//! nominal 50 KiB per entry), eviction is FIFO by insertion order, and
//! expired entries are treated as absent without being proactively purged.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use sysinfo::{RefreshKind, System, SystemExt};
use tracing::{debug, trace};

/// Fraction of total system memory the cache may target
const MEMORY_FRACTION: f64 = 0.2;

/// Nominal size of a cached entry in bytes, used for capacity sizing
const NOMINAL_ENTRY_BYTES: u64 = 1024 * 50;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Capacity-bounded key/value store with per-entry expiry.
///
/// Entries are evicted oldest-inserted-first when the cache is full; access
/// recency is not tracked. `get` treats an expired entry as absent but does
/// not remove it, so the slot is reclaimed either by a later `insert` of the
/// same key or by capacity eviction.
pub struct MemoryCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: VecDeque<String>,
    capacity: usize,
}

impl<V> MemoryCache<V> {
    /// Create a cache sized from total system memory.
    ///
    /// This is a heuristic sizing policy, not an exact memory bound: the
    /// cache targets at most 20% of system memory assuming a nominal
    /// 50 KiB per entry.
    pub fn new() -> Self {
        let system = System::new_with_specifics(RefreshKind::new().with_memory());
        let capacity = Self::max_capacity(system.total_memory());

        debug!("Initialized memory cache with capacity {capacity}");

        Self::with_capacity(capacity)
    }

    /// Create a cache with an explicit entry capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Calculate the maximum entry count for the given total memory in bytes
    fn max_capacity(total_memory: u64) -> usize {
        let budget = total_memory as f64 * MEMORY_FRACTION;
        (budget / NOMINAL_ENTRY_BYTES as f64).floor() as usize
    }

    /// Get the value for `key` if it is present and not expired.
    ///
    /// Expired entries behave as absent; they are not purged here.
    pub fn get(&self, key: &str) -> Option<&V> {
        let entry = self.entries.get(key)?;
        if Instant::now() < entry.expires_at {
            Some(&entry.value)
        } else {
            trace!("Cache entry expired: {key}");
            None
        }
    }

    /// Store `value` under `key` for `ttl_seconds`.
    ///
    /// A TTL below one second declines to store anything. Inserting a new
    /// key at capacity evicts the oldest-inserted key first; overwriting an
    /// existing key keeps its original insertion position.
    pub fn insert(&mut self, key: impl Into<String>, value: V, ttl_seconds: i64) {
        if ttl_seconds < 1 {
            trace!("Declining to cache entry with ttl {ttl_seconds}");
            return;
        }

        let key = key.into();

        if !self.entries.contains_key(&key) {
            if self.entries.len() >= self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    debug!("Cache at capacity, evicting oldest entry: {oldest}");
                    self.entries.remove(&oldest);
                }
            }
            self.order.push_back(key.clone());
        }

        let expires_at = Instant::now() + Duration::from_secs(ttl_seconds as u64);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Remove the entry for `key`, returning its value if one was stored.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.order.retain(|stored| stored != key);
        }
        removed.map(|entry| entry.value)
    }

    /// Whether a live (non-expired) entry exists for `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of stored entries, expired ones included until they are evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries this cache will hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
