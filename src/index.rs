//! Hash Index
//!
//! A separately chained hash table that stores no data of its own: each
//! bucket is the head of a singly linked chain threaded through the entries'
//! own `next` fields. The index maps a key to the entry that carries it, while
//! allocation and recency stay with the owner of the entries.
//!
//! The bucket count is always a power of two, so the bucket of a hash is
//! `hash & (buckets - 1)`: unsigned, sign-safe, and free of division.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use core::ptr::{self, NonNull};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// An entry type that can be threaded into a [`HashIndex`] chain.
///
/// # Safety
///
/// `hash` must return the value the index computed for `key` when the entry
/// was added, and `chain_next` must return whatever `set_chain_next` last
/// stored. Only the index may call `set_chain_next` while the entry is indexed.
pub unsafe trait Indexed: Sized {
    /// Key the entry is looked up by.
    type Key: Eq;

    /// The entry's key.
    fn key(&self) -> &Self::Key;
    /// Hash of the key, cached when the entry was created.
    fn hash(&self) -> u64;
    /// Next entry in the same bucket, or null.
    fn chain_next(&self) -> *mut Self;
    /// Relinks the bucket chain.
    fn set_chain_next(&mut self, next: *mut Self);
}

/// Rounds a requested bucket count up to a power of two without overflowing.
fn bucket_count_for(requested: NonZeroUsize) -> usize {
    const MAX_BUCKETS: usize = 1 << (usize::BITS - 1);
    requested
        .get()
        .checked_next_power_of_two()
        .unwrap_or(MAX_BUCKETS)
}

/// Key to entry index over intrusive hash chains.
pub struct HashIndex<E, S = DefaultHashBuilder> {
    buckets: Box<[*mut E]>,
    len: usize,
    hash_builder: S,
}

impl<E: Indexed, S: BuildHasher> HashIndex<E, S> {
    /// Creates an index with at least `buckets` buckets, rounded up to a
    /// power of two. Requests beyond the largest power of two are clamped
    /// to it.
    pub fn with_hasher(buckets: NonZeroUsize, hash_builder: S) -> Self {
        let buckets = bucket_count_for(buckets);
        HashIndex {
            buckets: vec![ptr::null_mut(); buckets].into_boxed_slice(),
            len: 0,
            hash_builder,
        }
    }

    /// Hashes `key` the way the index expects entries to be hashed.
    #[inline]
    pub fn hash<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        self.hash_builder.hash_one(key)
    }

    #[inline]
    fn bucket(&self, hash: u64) -> usize {
        // Truncation keeps the low bits, which are the ones the mask selects.
        (hash as usize) & (self.buckets.len() - 1)
    }

    /// Links `entry` into its bucket.
    ///
    /// Returns `false`, leaving the index untouched, if an entry with an
    /// equal key is already indexed.
    ///
    /// # Safety
    ///
    /// `entry` must be valid, not already indexed, and must stay valid until
    /// it is removed or the index is cleared.
    pub unsafe fn add(&mut self, entry: NonNull<E>) -> bool {
        let entry = entry.as_ptr();
        // SAFETY: the caller guarantees `entry` is valid.
        let (hash, key) = unsafe { ((*entry).hash(), (*entry).key()) };
        if self.find(hash, key).is_some() {
            return false;
        }

        let bucket = self.bucket(hash);
        // SAFETY: as above; the entry is not part of any chain yet.
        unsafe { (*entry).set_chain_next(self.buckets[bucket]) };
        self.buckets[bucket] = entry;
        self.len += 1;
        true
    }

    /// Unlinks `entry` by identity. Returns `false` if it is not indexed.
    ///
    /// # Safety
    ///
    /// `entry` must be valid.
    pub unsafe fn remove(&mut self, entry: NonNull<E>) -> bool {
        let target = entry.as_ptr();
        // SAFETY: the caller guarantees `entry` is valid.
        let bucket = self.bucket(unsafe { (*target).hash() });

        let mut prev: *mut E = ptr::null_mut();
        let mut cursor = self.buckets[bucket];
        while !cursor.is_null() {
            // SAFETY: chained entries are valid (contract of `add`).
            let next = unsafe { (*cursor).chain_next() };
            if cursor == target {
                if prev.is_null() {
                    self.buckets[bucket] = next;
                } else {
                    // SAFETY: `prev` is a chained entry distinct from `cursor`.
                    unsafe { (*prev).set_chain_next(next) };
                }
                // SAFETY: `cursor` is the valid entry being unlinked.
                unsafe { (*cursor).set_chain_next(ptr::null_mut()) };
                self.len -= 1;
                return true;
            }
            prev = cursor;
            cursor = next;
        }
        false
    }

    /// Finds the entry whose key equals `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<NonNull<E>>
    where
        E::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(self.hash(key), key)
    }

    fn find<Q>(&self, hash: u64, key: &Q) -> Option<NonNull<E>>
    where
        E::Key: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut cursor = self.buckets[self.bucket(hash)];
        while let Some(entry) = NonNull::new(cursor) {
            // SAFETY: chained entries are valid (contract of `add`).
            let candidate = unsafe { entry.as_ref() };
            if candidate.hash() == hash && Borrow::<Q>::borrow(candidate.key()) == key {
                return Some(entry);
            }
            cursor = candidate.chain_next();
        }
        None
    }

    /// Number of indexed entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when nothing is indexed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets, always a power of two.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Forgets every entry. Entries are not touched, so whoever owns them
    /// must free or reuse them.
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|head| *head = ptr::null_mut());
        self.len = 0;
    }
}

impl<E, S> fmt::Debug for HashIndex<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashIndex")
            .field("len", &self.len)
            .field("buckets", &self.buckets.len())
            .finish()
    }
}
