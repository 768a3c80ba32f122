//! Synchronized Cache Wrapper
//!
//! [`GenerationalCache`](crate::GenerationalCache) is not synchronized:
//! pointer surgery on its intrusive lists and hash chains must
//! never interleave. This module provides the thread-safe decorator that
//! serializes every operation behind one `parking_lot::Mutex`.
//!
//! ## Why Mutex Instead of RwLock?
//!
//! A `get()` on a generational cache is a write: it bumps a hit counter,
//! relinks the entry at the head of its generation and may promote it. Every
//! access therefore needs exclusive access anyway, and `Mutex` carries less
//! bookkeeping than `RwLock`.
//!
//! # Example
//!
//! ```rust
//! use reuse_rs::concurrent::SyncGenerationalCache;
//! use core::num::NonZeroUsize;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(SyncGenerationalCache::new(NonZeroUsize::new(1000).unwrap()));
//!
//! let handles: Vec<_> = (0..4).map(|t| {
//!     let cache = Arc::clone(&cache);
//!     thread::spawn(move || {
//!         for i in 0..100 {
//!             let key = format!("key_{}_{}", t, i);
//!             cache.put(key.clone(), i);
//!             let _ = cache.get(&key);
//!         }
//!     })
//! }).collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! // One hit each is below the promotion threshold, so only young holds keys.
//! assert_eq!(cache.len(), 250);
//! ```
//!
//! # Zero-Copy Access
//!
//! `get()` clones the value so the lock is released before returning. Use
//! `get_with()` to work on the value while the lock is held:
//!
//! ```rust,ignore
//! let len = cache.get_with(&key, |value| value.len());
//! ```

mod generational;

pub use self::generational::SyncGenerationalCache;
