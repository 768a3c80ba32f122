//! Cache Entry Type
//!
//! A [`CacheEntry`] is a single heap allocation that carries the key, the
//! value and every link the cache needs: the hash chain of the
//! [`HashIndex`](crate::index::HashIndex) and the prev/next pair of whichever
//! [`LruList`](crate::list::LruList) generation currently holds it. Moving an
//! entry between generations relinks it without reallocating.
//!
//! # Memory Layout
//!
//! Per-entry overhead on top of `K` and `V`:
//! - `hash: u64` - 8 bytes, cached so chains compare hashes before keys
//! - `chain_next` - one pointer
//! - `links` - two pointers
//! - `generation` and `hits` - 8 bytes with padding

use crate::index::Indexed;
use crate::list::{Linked, Links};
use core::fmt;
use core::ptr;

/// The generation an entry currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    /// Where every new key starts. Evictions from here free the entry.
    Young,
    /// Entries promoted after repeated hits. Evictions from here demote.
    Old,
}

/// An entry of a [`GenerationalCache`](crate::GenerationalCache).
pub struct CacheEntry<K, V> {
    /// The cached key.
    pub key: K,

    /// The cached value.
    pub value: V,

    hash: u64,
    chain_next: *mut CacheEntry<K, V>,
    links: Links<CacheEntry<K, V>>,
    generation: Generation,
    hits: u32,
}

impl<K, V> CacheEntry<K, V> {
    /// Creates an unlinked young entry with no hits.
    ///
    /// `hash` must be the hash the owning index computes for `key`.
    pub fn new(key: K, value: V, hash: u64) -> Self {
        CacheEntry {
            key,
            value,
            hash,
            chain_next: ptr::null_mut(),
            links: Links::new(),
            generation: Generation::Young,
            hits: 0,
        }
    }

    /// Generation the entry currently lives in.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Hits since the entry was created or last changed generation.
    #[inline]
    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Counts a hit and returns the new total.
    #[inline]
    pub(crate) fn record_hit(&mut self) -> u32 {
        self.hits = self.hits.saturating_add(1);
        self.hits
    }

    /// Moves the entry to `generation` and restarts its hit count.
    #[inline]
    pub(crate) fn enter(&mut self, generation: Generation) {
        self.generation = generation;
        self.hits = 0;
    }
}

// SAFETY: `links` is a plain field of the entry and is only written by the
// list holding the entry.
unsafe impl<K, V> Linked for CacheEntry<K, V> {
    #[inline]
    fn links(&self) -> &Links<Self> {
        &self.links
    }

    #[inline]
    fn links_mut(&mut self) -> &mut Links<Self> {
        &mut self.links
    }
}

// SAFETY: `hash` is fixed at construction by the cache from the index's own
// hasher, and `chain_next` is a plain field only the index writes.
unsafe impl<K: Eq, V> Indexed for CacheEntry<K, V> {
    type Key = K;

    #[inline]
    fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    fn chain_next(&self) -> *mut Self {
        self.chain_next
    }

    #[inline]
    fn set_chain_next(&mut self, next: *mut Self) {
        self.chain_next = next;
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CacheEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("generation", &self.generation)
            .field("hits", &self.hits)
            .finish()
    }
}
