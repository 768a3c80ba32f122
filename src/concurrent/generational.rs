//! Mutex-guarded generational cache.

extern crate alloc;

use crate::config::GenerationalCacheConfig;
use crate::entry::Generation;
use crate::error::ConfigError;
use crate::generational::GenerationalCache;
use crate::metrics::{CacheMetrics, GenerationalCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A [`GenerationalCache`] shared between threads behind a single lock.
///
/// Every method takes `&self` and holds the lock for exactly one cache
/// operation, so promotions and evictions are never observed half done.
pub struct SyncGenerationalCache<K, V, S = DefaultHashBuilder> {
    inner: Mutex<GenerationalCache<K, V, S>>,
}

impl<K: Hash + Eq, V> SyncGenerationalCache<K, V> {
    /// Creates a cache of `capacity` entries with default settings.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::from_cache(GenerationalCache::new(capacity))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> SyncGenerationalCache<K, V, S> {
    /// Creates a cache from a configuration and optional hasher.
    pub fn init(config: GenerationalCacheConfig, hasher: Option<S>) -> Result<Self, ConfigError>
    where
        S: Default,
    {
        GenerationalCache::init(config, hasher).map(Self::from_cache)
    }

    /// Wraps an existing cache.
    pub fn from_cache(cache: GenerationalCache<K, V, S>) -> Self {
        SyncGenerationalCache {
            inner: Mutex::new(cache),
        }
    }

    /// Unwraps the cache.
    pub fn into_inner(self) -> GenerationalCache<K, V, S> {
        self.inner.into_inner()
    }

    /// Gets a clone of the value, counting a hit.
    ///
    /// This clones the value to avoid holding the lock. For zero-copy access,
    /// use `get_with()` instead.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Gets a value and applies a function to it while holding the lock.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.inner.lock().get(key).map(f)
    }

    /// Gets a mutable value and applies a function to it while holding the lock.
    pub fn get_mut_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&mut V) -> R,
    {
        self.inner.lock().get_mut(key).map(f)
    }

    /// Inserts or overwrites a value, returning the previous one.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().put(key, value)
    }

    /// Inserts `Some(value)`, or removes `key` when given `None`.
    pub fn set(&self, key: K, value: Option<V>) -> Option<V> {
        self.inner.lock().set(key, value)
    }

    /// Removes a key, returning its value if it was cached.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().remove(key)
    }

    /// Returns `true` if the cache contains the key. Does not count a hit.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().contains_key(key)
    }

    /// Returns the generation currently holding `key`.
    pub fn generation_of<Q>(&self, key: &Q) -> Option<Generation>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().generation_of(key)
    }

    /// Clears all entries from the cache.
    pub fn clear(&self) {
        self.inner.lock().clear()
    }
}

impl<K, V, S> SyncGenerationalCache<K, V, S> {
    /// Total capacity across both generations.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Snapshot of the cache's metrics.
    pub fn metrics_snapshot(&self) -> GenerationalCacheMetrics {
        self.inner.lock().metrics().clone()
    }
}

impl<K, V, S> CacheMetrics for SyncGenerationalCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.lock().metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "SyncGenerational"
    }
}

impl<K, V, S> core::fmt::Debug for SyncGenerationalCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyncGenerationalCache")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
