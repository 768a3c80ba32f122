//! Generational LRU Cache Implementation
//!
//! A two-tier cache that keeps frequently reused entries away from one-off
//! traffic. Every key enters a small **young generation**; only keys that
//! collect enough hits there are promoted into the larger **old generation**.
//! Both generations are plain LRU lists sharing one hash index, so every
//! operation is O(1).
//!
//! # How the Algorithm Works
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                           Generational Cache                                │
//! │                                                                             │
//! │  ┌───────────────────────────────────────────────────────────────────────┐  │
//! │  │                    OLD GENERATION (old_ratio)                         │  │
//! │  │  MRU ◀──▶ [hot_1] ◀──▶ [hot_2] ◀──▶ ... ◀──▶ [tail] LRU              │  │
//! │  └───────────────────────────────────────────────────────────────────────┘  │
//! │            ▲ promote (hits >= threshold)        │ demote (old overflow)     │
//! │            │                                    ▼                           │
//! │  ┌───────────────────────────────────────────────────────────────────────┐  │
//! │  │                    YOUNG GENERATION (the rest)                        │  │
//! │  │  MRU ◀──▶ [new_1] ◀──▶ [new_2] ◀──▶ ... ◀──▶ [tail] LRU ──▶ freed     │  │
//! │  └───────────────────────────────────────────────────────────────────────┘  │
//! │            ▲ insert                                                         │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entry Lifecycle
//!
//! 1. **Insert**: a new key enters the head of the young generation. If young
//!    overflows, its tail is evicted and freed.
//! 2. **Hit in young**: the hit counter grows and the entry moves to young's
//!    head. Once the counter reaches `promotion_threshold` the entry is
//!    promoted to old's head with its counter reset.
//! 3. **Old overflow**: a promotion that overflows old demotes old's tail back
//!    to young's head instead of freeing it.
//! 4. **Hit in old**: the entry moves to old's head.
//!
//! Only the young generation ever frees data, so a burst of single-use keys
//! churns young without displacing anything in old.
//!
//! ## Operations
//!
//! | Operation | Action | Time |
//! |-----------|--------|------|
//! | `get(key)` | Count a hit, refresh recency, maybe promote | O(1) |
//! | `put(key, value)` | Overwrite in place, or insert into young | O(1) |
//! | `set(key, None)` | Same as `remove(key)` | O(1) |
//! | `remove(key)` | Unlink from index and generation | O(1) |
//!
//! # Thread Safety
//!
//! `GenerationalCache` is **not** synchronized; mutation needs `&mut self`.
//! Wrap it in [`SyncGenerationalCache`](crate::concurrent::SyncGenerationalCache)
//! (feature `concurrent`) or your own lock to share it between threads.
//!
//! # Examples
//!
//! ```
//! use reuse_rs::GenerationalCache;
//! use reuse_rs::config::GenerationalCacheConfig;
//! use core::num::NonZeroUsize;
//!
//! let config = GenerationalCacheConfig::new(NonZeroUsize::new(8).unwrap())
//!     .with_old_ratio(0.5)
//!     .with_promotion_threshold(2);
//! let mut cache: GenerationalCache<u32, u32> = GenerationalCache::init(config, None).unwrap();
//!
//! // Establish hot keys in the old generation
//! for key in [1, 2, 3] {
//!     cache.put(key, key * 100);
//!     cache.get(&key);
//!     cache.get(&key);
//! }
//!
//! // A scan of one-off keys only churns the young generation
//! for key in 100..120 {
//!     cache.put(key, key);
//! }
//!
//! assert_eq!(cache.get(&1), Some(&100));
//! assert_eq!(cache.get(&2), Some(&200));
//! assert_eq!(cache.get(&3), Some(&300));
//! ```

extern crate alloc;

use crate::config::GenerationalCacheConfig;
use crate::entry::{CacheEntry, Generation};
use crate::error::ConfigError;
use crate::index::HashIndex;
use crate::list::LruList;
use crate::metrics::{CacheMetrics, GenerationalCacheMetrics};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::{Arc, Weak};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::num::NonZeroUsize;
use core::ptr::NonNull;
use tracing::{debug, trace};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

type Node<K, V> = NonNull<CacheEntry<K, V>>;

/// A young/old generational LRU cache.
///
/// Entries are heap allocated once on insertion and freed on removal, young
/// eviction or [`clear`](GenerationalCache::clear); promotion and demotion
/// only relink them.
///
/// # Examples
///
/// ```
/// use reuse_rs::GenerationalCache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = GenerationalCache::new(NonZeroUsize::new(100).unwrap());
/// cache.put("apple", 3);
/// assert_eq!(cache.get(&"apple"), Some(&3));
/// assert_eq!(cache.put("apple", 4), Some(3));
/// assert_eq!(cache.remove(&"apple"), Some(4));
/// assert!(cache.is_empty());
/// ```
pub struct GenerationalCache<K, V, S = DefaultHashBuilder> {
    config: GenerationalCacheConfig,
    young: LruList<CacheEntry<K, V>>,
    old: LruList<CacheEntry<K, V>>,
    index: HashIndex<CacheEntry<K, V>, S>,
    metrics: GenerationalCacheMetrics,
}

// SAFETY: the cache exclusively owns every entry its pointers refer to.
unsafe impl<K: Send, V: Send, S: Send> Send for GenerationalCache<K, V, S> {}

// SAFETY: all mutation requires `&mut self`; shared access only reads.
unsafe impl<K: Sync, V: Sync, S: Sync> Sync for GenerationalCache<K, V, S> {}

impl<K: Hash + Eq, V> GenerationalCache<K, V> {
    /// Creates a cache of `capacity` entries with the default old ratio,
    /// promotion threshold and hasher.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_config(
            GenerationalCacheConfig::new(capacity),
            DefaultHashBuilder::default(),
        )
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> GenerationalCache<K, V, S> {
    /// Creates a cache from a configuration.
    ///
    /// Uses `hasher` when given and the hasher's default otherwise. The
    /// capacity is raised to `min_capacity` (and to at least two) before it
    /// is split between the generations.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter found by
    /// [`GenerationalCacheConfig::validate`].
    pub fn init(config: GenerationalCacheConfig, hasher: Option<S>) -> Result<Self, ConfigError>
    where
        S: Default,
    {
        config.validate()?;
        Ok(Self::with_config(config, hasher.unwrap_or_default()))
    }

    fn with_config(config: GenerationalCacheConfig, hash_builder: S) -> Self {
        let capacity = config.effective_capacity();
        let (young_capacity, old_capacity) = config.generation_capacities();
        let config = GenerationalCacheConfig { capacity, ..config };

        debug!(
            capacity = capacity.get(),
            young_capacity = young_capacity.get(),
            old_capacity = old_capacity.get(),
            promotion_threshold = config.promotion_threshold,
            "created generational cache"
        );

        GenerationalCache {
            config,
            young: LruList::new(young_capacity),
            old: LruList::new(old_capacity),
            index: HashIndex::with_hasher(capacity, hash_builder),
            metrics: GenerationalCacheMetrics::new(old_capacity.get() as u64),
        }
    }

    /// Returns a reference to the value of `key`, counting a hit.
    ///
    /// The key may be any borrowed form of the cache's key type, but
    /// [`Hash`] and [`Eq`] on the borrowed form *must* match those for
    /// the key type.
    ///
    /// A hit refreshes the entry's recency within its generation and may
    /// promote it from young to old.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.lookup(key)?;
        // SAFETY: indexed entries stay allocated until unlinked, and
        // `touch` only relinks.
        unsafe {
            self.touch(node);
            Some(&(*node.as_ptr()).value)
        }
    }

    /// Returns a mutable reference to the value of `key`, counting a hit
    /// exactly like [`get`](GenerationalCache::get).
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.lookup(key)?;
        // SAFETY: see `get`.
        unsafe {
            self.touch(node);
            Some(&mut (*node.as_ptr()).value)
        }
    }

    /// Returns the value of `key` without counting a hit or touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index
            .get(key)
            // SAFETY: indexed entries stay allocated while `self` is borrowed.
            .map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Returns `true` if `key` is cached. Does not count a hit.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.get(key).is_some()
    }

    /// Returns the generation currently holding `key`.
    pub fn generation_of<Q>(&self, key: &Q) -> Option<Generation>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index
            .get(key)
            // SAFETY: as in `peek`.
            .map(|node| unsafe { node.as_ref() }.generation())
    }

    /// Inserts or overwrites the value of `key`.
    ///
    /// An existing key keeps its generation, position and hit count, and its
    /// previous value is returned. A new key enters the young generation,
    /// possibly evicting young's least recently used entry.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(node) = self.index.get(&key) {
            self.metrics.core.record_update();
            // SAFETY: indexed entries stay allocated until unlinked.
            let slot = unsafe { &mut (*node.as_ptr()).value };
            return Some(mem::replace(slot, value));
        }

        let hash = self.index.hash(&key);
        let node = NonNull::from(Box::leak(Box::new(CacheEntry::new(key, value, hash))));

        // SAFETY: `node` is a fresh allocation owned by the cache from here on.
        unsafe {
            let indexed = self.index.add(node);
            debug_assert!(indexed, "key was checked to be absent");
            if let Some(evicted) = self.young.add(node) {
                self.evict(evicted);
            }
        }

        self.metrics.core.record_insertion();
        self.sync_sizes();
        None
    }

    /// Inserts `Some(value)` like [`put`](GenerationalCache::put), or removes
    /// `key` when given `None`.
    pub fn set(&mut self, key: K, value: Option<V>) -> Option<V> {
        match value {
            Some(value) => self.put(key, value),
            None => self.remove(&key),
        }
    }

    /// Removes `key`, returning its value if it was cached.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.index.get(key)?;
        // SAFETY: `node` is indexed and therefore linked and allocated.
        let entry = unsafe { self.unlink(node) };
        self.metrics.core.record_removal();
        self.sync_sizes();
        Some(entry.value)
    }

    /// Removes every entry. Capacity and metrics counters are kept.
    pub fn clear(&mut self) {
        self.free_all();
        self.index.clear();
        self.sync_sizes();
    }

    fn lookup<Q>(&mut self, key: &Q) -> Option<Node<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.index.get(key);
        if node.is_none() {
            self.metrics.core.record_miss();
        }
        node
    }

    /// Counts a hit on `node` and applies the recency and promotion rules.
    ///
    /// # Safety
    ///
    /// `node` must be an indexed entry of this cache.
    unsafe fn touch(&mut self, node: Node<K, V>) {
        // SAFETY: forwarded from the caller; the reference ends before any
        // list operation touches the entry.
        let (generation, hits) = unsafe {
            let entry = &mut *node.as_ptr();
            (entry.generation(), entry.record_hit())
        };

        // SAFETY: the entry is linked into the list matching its generation.
        unsafe {
            match generation {
                Generation::Young => {
                    self.metrics.record_young_hit();
                    if hits >= self.config.promotion_threshold {
                        self.promote(node);
                    } else {
                        self.young.move_to_head(node);
                    }
                }
                Generation::Old => {
                    self.metrics.record_old_hit();
                    self.old.move_to_head(node);
                }
            }
        }
    }

    /// Moves a young entry to the head of old, demoting old's tail on
    /// overflow.
    unsafe fn promote(&mut self, node: Node<K, V>) {
        // SAFETY: the caller passes a linked young entry; every transfer
        // unlinks before relinking.
        unsafe {
            self.young.remove(node);
            (*node.as_ptr()).enter(Generation::Old);
            self.metrics.record_promotion();
            trace!("promoted entry to old generation");

            if let Some(demoted) = self.old.add(node) {
                (*demoted.as_ptr()).enter(Generation::Young);
                self.metrics.record_demotion();
                trace!("demoted entry to young generation");

                // Young just gave up `node`, so this cannot overflow in
                // practice; handle it like any other young eviction.
                if let Some(evicted) = self.young.add(demoted) {
                    self.evict(evicted);
                }
            }
        }
        self.sync_sizes();
    }

    /// Frees an entry already unlinked from its generation.
    unsafe fn evict(&mut self, node: Node<K, V>) {
        // SAFETY: the caller hands over an entry that is still indexed and no
        // longer linked into any list.
        unsafe {
            let indexed = self.index.remove(node);
            assert!(indexed, "evicted entry missing from index");
            drop(Box::from_raw(node.as_ptr()));
        }
        self.metrics.core.record_eviction();
        trace!("evicted entry from young generation");
    }

    /// Unlinks an indexed entry from the index and its generation and takes
    /// ownership of it.
    unsafe fn unlink(&mut self, node: Node<K, V>) -> Box<CacheEntry<K, V>> {
        // SAFETY: the caller passes an indexed entry, which is linked into
        // exactly the list its generation names.
        unsafe {
            let indexed = self.index.remove(node);
            assert!(indexed, "unlinking an entry missing from index");
            match node.as_ref().generation() {
                Generation::Young => self.young.remove(node),
                Generation::Old => self.old.remove(node),
            }
            Box::from_raw(node.as_ptr())
        }
    }
}

impl<K, V, S> GenerationalCache<K, V, S> {
    /// Total capacity across both generations.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity.get()
    }

    /// Number of cached entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.young.len() + self.old.len()
    }

    /// Returns `true` when nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries in the young generation.
    #[inline]
    pub fn young_len(&self) -> usize {
        self.young.len()
    }

    /// Number of entries in the old generation.
    #[inline]
    pub fn old_len(&self) -> usize {
        self.old.len()
    }

    /// Slots of the young generation.
    #[inline]
    pub fn young_capacity(&self) -> usize {
        self.young.cap().get()
    }

    /// Slots of the old generation.
    #[inline]
    pub fn old_capacity(&self) -> usize {
        self.old.cap().get()
    }

    /// Hits a young entry needs before promotion.
    #[inline]
    pub fn promotion_threshold(&self) -> u32 {
        self.config.promotion_threshold
    }

    /// Returns the cache's running metrics.
    #[inline]
    pub fn metrics(&self) -> &GenerationalCacheMetrics {
        &self.metrics
    }

    fn sync_sizes(&mut self) {
        self.metrics
            .update_generation_sizes(self.young.len() as u64, self.old.len() as u64);
    }

    /// Frees every entry of both generations. The index still points at the
    /// freed entries until it is cleared.
    fn free_all(&mut self) {
        for list in [&mut self.young, &mut self.old] {
            while let Some(node) = list.pop_tail() {
                // SAFETY: every linked entry was leaked from a Box by `put`
                // and is owned by the cache alone.
                drop(unsafe { Box::from_raw(node.as_ptr()) });
            }
        }
    }
}

impl<K: Hash + Eq, T, S: BuildHasher> GenerationalCache<K, Weak<T>, S> {
    /// Returns the value of `key` if it is still alive elsewhere.
    ///
    /// A hit on a live value counts like [`get`](GenerationalCache::get). An
    /// entry whose value has been dropped is removed and reported as a miss.
    pub fn get_live<Q>(&mut self, key: &Q) -> Option<Arc<T>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.lookup(key)?;
        // SAFETY: indexed entries stay allocated until unlinked.
        let live = unsafe { node.as_ref() }.value.upgrade();
        match live {
            Some(value) => {
                // SAFETY: `node` is still indexed.
                unsafe { self.touch(node) };
                Some(value)
            }
            None => {
                // SAFETY: `node` is still indexed.
                drop(unsafe { self.unlink(node) });
                self.metrics.core.record_miss();
                self.metrics.record_expired();
                self.sync_sizes();
                trace!("dropped entry whose value is gone");
                None
            }
        }
    }
}

impl<K, V, S> Drop for GenerationalCache<K, V, S> {
    fn drop(&mut self) {
        self.free_all();
    }
}

impl<K, V, S> fmt::Debug for GenerationalCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationalCache")
            .field("capacity", &self.capacity())
            .field("young", &self.young)
            .field("old", &self.old)
            .field("promotion_threshold", &self.config.promotion_threshold)
            .finish()
    }
}

impl<K, V, S> CacheMetrics for GenerationalCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::string::ToString;
    use std::vec::Vec;

    use super::*;

    fn make_cache<K: Hash + Eq, V>(
        capacity: usize,
        old_ratio: f64,
        threshold: u32,
    ) -> GenerationalCache<K, V> {
        let config = GenerationalCacheConfig::new(NonZeroUsize::new(capacity).unwrap())
            .with_old_ratio(old_ratio)
            .with_promotion_threshold(threshold);
        GenerationalCache::init(config, None).unwrap()
    }

    /// Walks both lists and checks them against the index.
    fn assert_consistent<K: Hash + Eq, V>(cache: &GenerationalCache<K, V>) {
        assert!(cache.young.len() <= cache.young.cap().get());
        assert!(cache.old.len() <= cache.old.cap().get());
        assert_eq!(cache.index.len(), cache.len());
        for (list, generation) in [(&cache.young, Generation::Young), (&cache.old, Generation::Old)] {
            assert_eq!(list.iter().count(), list.len());
            for entry in list.iter() {
                assert_eq!(entry.generation(), generation);
                let found = cache.index.get(&entry.key).unwrap();
                assert!(core::ptr::eq(found.as_ptr(), entry));
            }
        }
    }

    #[test]
    fn test_young_eviction_frees_entry() {
        let mut cache = make_cache(2, 0.5, 2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.metrics().core.evictions, 1);
        assert_consistent(&cache);
    }

    #[test]
    fn test_promoted_entry_survives_insert() {
        let mut cache = make_cache(2, 0.5, 2);
        cache.put("a", 1);
        cache.get(&"a");
        cache.get(&"a");
        assert_eq!(cache.generation_of(&"a"), Some(Generation::Old));

        cache.put("b", 2);
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.len(), 2);
        assert_consistent(&cache);
    }

    #[test]
    fn test_old_overflow_demotes_instead_of_freeing() {
        let mut cache = make_cache(4, 0.5, 1);
        cache.put(1, "one");
        cache.get(&1);
        cache.put(2, "two");
        cache.get(&2);
        assert_eq!(cache.old_len(), 2);

        // A third promotion overflows old; its tail (1) goes back to young.
        cache.put(3, "three");
        cache.get(&3);
        assert_eq!(cache.generation_of(&1), Some(Generation::Young));
        assert_eq!(cache.generation_of(&2), Some(Generation::Old));
        assert_eq!(cache.generation_of(&3), Some(Generation::Old));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.metrics().demotions, 1);
        assert_eq!(cache.metrics().core.evictions, 0);
        assert_consistent(&cache);
    }

    #[test]
    fn test_hit_below_threshold_only_refreshes_recency() {
        let mut cache = make_cache(6, 0.5, 3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.get(&"a");
        assert_eq!(cache.generation_of(&"a"), Some(Generation::Young));

        // "b" is now young's least recently used entry.
        cache.put("d", 4);
        assert_eq!(cache.peek(&"b"), None);
        assert_eq!(cache.peek(&"a"), Some(&1));
        assert_consistent(&cache);
    }

    #[test]
    fn test_put_existing_keeps_position_and_generation() {
        let mut cache = make_cache(4, 0.5, 1);
        cache.put("hot", 1);
        cache.get(&"hot");
        assert_eq!(cache.put("hot", 10), Some(1));
        assert_eq!(cache.generation_of(&"hot"), Some(Generation::Old));

        cache.put("x", 1);
        cache.put("y", 2);
        // Overwriting does not refresh "x", so "x" is still young's tail.
        cache.put("x", 5);
        cache.put("z", 3);
        assert!(!cache.contains_key(&"x"));
        assert_eq!(cache.peek(&"hot"), Some(&10));
        assert_eq!(cache.metrics().core.updates, 2);
    }

    #[test]
    fn test_set_none_is_remove_and_idempotent() {
        let mut cache = make_cache(4, 0.5, 2);
        cache.set("k".to_string(), Some(1));
        assert_eq!(cache.peek("k"), Some(&1));

        assert_eq!(cache.set("k".to_string(), None), Some(1));
        assert_eq!(cache.peek("k"), None);
        assert_eq!(cache.set("k".to_string(), None), None);
        assert!(cache.is_empty());
        assert_consistent(&cache);
    }

    #[test]
    fn test_remove_from_either_generation() {
        let mut cache = make_cache(4, 0.5, 1);
        cache.put("young", 1);
        cache.put("old", 2);
        cache.get(&"old");

        assert_eq!(cache.remove(&"old"), Some(2));
        assert_eq!(cache.remove(&"young"), Some(1));
        assert_eq!(cache.remove(&"young"), None);
        assert_eq!(cache.old_len(), 0);
        assert_eq!(cache.young_len(), 0);
        assert_eq!(cache.metrics().core.removals, 2);
    }

    #[test]
    fn test_capacity_unaffected_by_clear_put_remove() {
        let mut cache = make_cache(10, 0.75, 2);
        assert_eq!(cache.capacity(), 10);
        for i in 0..50 {
            cache.put(i, i);
        }
        assert_eq!(cache.capacity(), 10);
        cache.remove(&49);
        assert_eq!(cache.capacity(), 10);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.young_len() + cache.old_len(), 0);
        assert_eq!(cache.capacity(), 10);
        assert_eq!(cache.get(&48), None);
        assert_consistent(&cache);

        cache.put(1, 1);
        assert_eq!(cache.get(&1), Some(&1));
    }

    #[test]
    fn test_capacity_clamped_to_minimum() {
        let config = GenerationalCacheConfig::new(NonZeroUsize::new(1).unwrap());
        let cache: GenerationalCache<u8, u8> = GenerationalCache::init(config, None).unwrap();
        assert_eq!(cache.capacity(), 2);
        assert_eq!(cache.young_capacity() + cache.old_capacity(), 2);

        let config = GenerationalCacheConfig::new(NonZeroUsize::new(3).unwrap())
            .with_min_capacity(NonZeroUsize::new(16).unwrap());
        let cache: GenerationalCache<u8, u8> = GenerationalCache::init(config, None).unwrap();
        assert_eq!(cache.capacity(), 16);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config =
            GenerationalCacheConfig::new(NonZeroUsize::new(8).unwrap()).with_old_ratio(0.0);
        let cache: Result<GenerationalCache<u8, u8>, _> = GenerationalCache::init(config, None);
        assert_eq!(cache.err(), Some(ConfigError::InvalidOldRatio(0.0)));
    }

    #[test]
    fn test_get_mut_counts_as_hit() {
        let mut cache = make_cache(4, 0.5, 2);
        cache.put("a", Vec::from([1]));
        cache.get_mut(&"a").unwrap().push(2);
        cache.get_mut(&"a").unwrap().push(3);
        assert_eq!(cache.generation_of(&"a"), Some(Generation::Old));
        assert_eq!(cache.peek(&"a").map(Vec::len), Some(3));
    }

    #[test]
    fn test_get_live_drops_dead_values() {
        let mut cache: GenerationalCache<&str, Weak<u32>> = make_cache(4, 0.5, 2);
        let alive = Arc::new(1);
        let dead = Arc::new(2);
        cache.put("alive", Arc::downgrade(&alive));
        cache.put("dead", Arc::downgrade(&dead));
        drop(dead);

        assert_eq!(cache.get_live(&"alive").as_deref(), Some(&1));
        assert_eq!(cache.get_live(&"dead"), None);
        assert!(!cache.contains_key(&"dead"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.metrics().expired, 1);
        assert_consistent(&cache);
    }

    #[test]
    fn test_metrics_report() {
        let mut cache = make_cache(4, 0.5, 1);
        cache.put("a", 1);
        cache.get(&"a");
        cache.get(&"a");
        cache.get(&"missing");

        let metrics = cache.metrics();
        assert_eq!(metrics.core.requests, 3);
        assert_eq!(metrics.young_hits, 1);
        assert_eq!(metrics.old_hits, 1);
        assert_eq!(metrics.promotions, 1);

        let report = CacheMetrics::metrics(&cache);
        assert_eq!(report["old_size"], 1.0);
        assert_eq!(report["young_size"], 0.0);
        assert_eq!(cache.algorithm_name(), "Generational");
    }

    #[test]
    fn test_drop_frees_values() {
        let value = Arc::new(());
        {
            let mut cache = make_cache(4, 0.5, 1);
            for i in 0..4 {
                cache.put(i, Arc::clone(&value));
                cache.get(&i);
            }
            assert_eq!(Arc::strong_count(&value), 5);
        }
        assert_eq!(Arc::strong_count(&value), 1);
    }

    #[test]
    fn test_random_workload_stays_consistent() {
        let mut cache = make_cache(16, 0.75, 3);
        let mut state: u32 = 0x9e37_79b9;
        for _ in 0..5_000 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let key = state % 40;
            match state % 7 {
                0 => {
                    cache.remove(&key);
                }
                1 | 2 => {
                    cache.put(key, key);
                }
                _ => {
                    if let Some(value) = cache.get(&key) {
                        assert_eq!(*value, key);
                    }
                }
            }
        }
        assert_consistent(&cache);
        assert!(cache.len() <= cache.capacity());
    }
}
