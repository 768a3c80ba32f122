#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Component Map
//!
//! ```text
//! ┌──────────────────────────────┐      ┌──────────────────────────────────┐
//! │         ShardedPool          │      │        GenerationalCache         │
//! │  handle() ─▶ ShardHandle     │      │  get / put / set / remove        │
//! │  ┌──────┐ ┌──────┐ ┌──────┐  │      │  ┌───────────┐   ┌───────────┐   │
//! │  │ Pool │ │ Pool │ │ Pool │  │      │  │ young     │◀─▶│ old       │   │
//! │  └──┬───┘ └──────┘ └──────┘  │      │  │ LruList   │   │ LruList   │   │
//! │     │                        │      │  └───────────┘   └───────────┘   │
//! │  ┌──▼──────────┐ ┌────────┐  │      │          ┌───────────┐           │
//! │  │ free stack  │ │occupied│  │      │          │ HashIndex │           │
//! │  │ (CasStack)  │ │ stack  │  │      │          └───────────┘           │
//! │  └─────────────┘ └────────┘  │      │                                  │
//! └──────────────────────────────┘      └──────────────────────────────────┘
//!        lock-free, &self                    unsynchronized, &mut self
//! ```
//!
//! ## Quick Reference
//!
//! | Type | Description | Thread Safety |
//! |------|-------------|---------------|
//! | [`Pool`] | Bounded lock-free object pool | `Sync` |
//! | [`ShardedPool`] | N pools with per-caller shard handles | `Sync` |
//! | [`GenerationalCache`] | Young/old generational LRU cache | needs `&mut` |
//! | `SyncGenerationalCache` | Mutex-guarded cache (feature `concurrent`) | `Sync` |
//!
//! ## Code Examples
//!
//! ### Pool
//!
//! ```rust
//! use reuse_rs::{FnManager, Pool};
//! use core::num::NonZeroUsize;
//!
//! let pool: Pool<String, _> = Pool::new(
//!     NonZeroUsize::new(8).unwrap(),
//!     FnManager::new(|| String::with_capacity(256)),
//! );
//! let mut s = pool.acquire();
//! s.push_str("hello");
//! s.clear();
//! pool.release(s);
//! assert_eq!(pool.idle(), 1);
//! ```
//!
//! ### Generational Cache
//!
//! ```rust
//! use reuse_rs::GenerationalCache;
//! use reuse_rs::config::GenerationalCacheConfig;
//! use core::num::NonZeroUsize;
//!
//! let config = GenerationalCacheConfig {
//!     capacity: NonZeroUsize::new(2).unwrap(),
//!     old_ratio: 0.5,
//!     promotion_threshold: 2,
//!     min_capacity: NonZeroUsize::new(2).unwrap(),
//! };
//! let mut cache: GenerationalCache<&str, i32> = GenerationalCache::init(config, None).unwrap();
//!
//! cache.put("a", 1);
//! cache.get(&"a");
//! cache.get(&"a"); // second hit promotes "a" to the old generation
//! cache.put("b", 2);
//!
//! assert_eq!(cache.get(&"a"), Some(&1));
//! assert_eq!(cache.get(&"b"), Some(&2));
//! ```

#![no_std]

#[cfg(test)]
extern crate scoped_threadpool;

#[cfg(any(feature = "std", not(feature = "hashbrown")))]
extern crate std;

/// Lock-free intrusive stack used by the pools.
pub(crate) mod stack;

/// Bounded lock-free object pool.
///
/// Recycles payloads through two CAS stacks and falls back to creation or
/// destruction instead of blocking.
pub mod pool;

/// Sharded object pool with explicit per-caller shard handles.
pub mod sharded;

/// Intrusive separately chained hash index.
///
/// **Note**: This module exposes unsafe raw pointer operations. Use
/// [`GenerationalCache`] unless you are building your own intrusive container.
pub mod index;

/// Intrusive doubly linked LRU list with a fixed capacity.
///
/// **Note**: Like [`index`], this is infrastructure with unsafe raw pointer
/// operations.
pub mod list;

/// Cache entry type carrying its own index and list links.
pub mod entry;

/// Young/old generational LRU cache.
pub mod generational;

/// Configuration structures for pools and caches.
pub mod config;

/// Construction errors.
pub mod error;

/// Cache metrics and pool statistics.
pub mod metrics;

/// Thread-safe wrapper around the generational cache.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use entry::{CacheEntry, Generation};
pub use error::ConfigError;
pub use generational::GenerationalCache;
pub use metrics::{CacheMetrics, PoolStats};
pub use pool::{FnManager, Pool, PoolManager};
pub use sharded::{ShardHandle, ShardedPool};

#[cfg(feature = "concurrent")]
pub use concurrent::SyncGenerationalCache;
