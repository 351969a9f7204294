//! Memoized classifications of component pairs
//!
//! Classifying two components is the expensive step of every boolean operation, and
//! the same pairs come up again and again while a region is normalized. Results are kept
//! in a bounded LRU keyed by the structural identities of the two components.

use crate::classification::Classification;
use crate::component::ComponentId;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Counters describing cache usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Bounded cache of component pair classifications
///
/// The lock is only held while an entry is read or written. Two threads that miss on
/// the same pair both compute it and the second insert simply replaces the first.
pub struct ClassificationCache {
    entries: Mutex<LruCache<(ComponentId, ComponentId), Classification>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ClassificationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(non_zero(capacity))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up the classification of `left` against `right`
    pub fn get(&self, left: ComponentId, right: ComponentId) -> Option<Classification> {
        let found = self.entries.lock().get(&(left, right)).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    pub fn insert(&self, left: ComponentId, right: ComponentId, classification: Classification) {
        self.entries.lock().put((left, right), classification);
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Change the maximum number of entries, evicting the oldest if needed
    pub fn resize(&self, capacity: usize) {
        self.entries.lock().resize(non_zero(capacity));
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}

fn non_zero(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

static GLOBAL: OnceLock<ClassificationCache> = OnceLock::new();

/// The process-wide cache used by [`crate::classification::classify`]
pub fn global() -> &'static ClassificationCache {
    GLOBAL.get_or_init(|| ClassificationCache::new(crate::config::DEFAULT_CACHE_CAPACITY))
}

/// Empty the process-wide cache
pub fn clear() {
    global().clear();
}

/// Usage counters of the process-wide cache
pub fn stats() -> CacheStats {
    global().stats()
}
