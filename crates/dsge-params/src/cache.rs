//! A generic single-writer/many-reader cache keyed by parameter
//! fingerprint, repurposed from the teacher's `perth-data::cache` module
//! (originally a SQLite quote cache) for in-process sub-result caching (§5).
//!
//! A reader that misses drops the read lock before recomputing, then takes
//! the write lock only to insert — recomputation never happens while
//! holding the lock, so two threads racing on the same miss simply
//! recompute independently and the second insert wins.

use std::collections::HashMap;
use std::sync::RwLock;

/// Cache of values of type `V` keyed by a 64-bit parameter fingerprint.
#[derive(Debug, Default)]
pub struct FingerprintCache<V> {
    entries: RwLock<HashMap<u64, V>>,
}

impl<V: Clone> FingerprintCache<V> {
    /// Construct an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, or compute it via `compute`,
    /// cache it, and return it.
    pub fn get_or_compute(&self, key: u64, compute: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.entries.read().expect("cache lock poisoned").get(&key) {
            return hit.clone();
        }
        let value = compute();
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(key, value.clone());
        value
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
