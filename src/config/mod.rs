//! Configuration
//!
//! Configuration structs with public fields for every pool and cache in the
//! crate. Invariants the type system can carry (non-zero capacities) are
//! encoded with `NonZeroUsize`; the rest are checked by `validate()` before
//! anything is allocated.
//!
//! | Config | Built type |
//! |--------|------------|
//! | [`PoolConfig`] | [`Pool`](crate::Pool) |
//! | [`ShardedPoolConfig`] | [`ShardedPool`](crate::ShardedPool) |
//! | [`GenerationalCacheConfig`] | [`GenerationalCache`](crate::GenerationalCache) |
//!
//! # Examples
//!
//! ```
//! use reuse_rs::config::GenerationalCacheConfig;
//! use reuse_rs::GenerationalCache;
//! use core::num::NonZeroUsize;
//!
//! let config = GenerationalCacheConfig::new(NonZeroUsize::new(1000).unwrap())
//!     .with_promotion_threshold(4);
//! let cache: GenerationalCache<String, i32> = GenerationalCache::init(config, None).unwrap();
//! assert_eq!(cache.capacity(), 1000);
//! ```

pub mod generational;
pub mod pool;

pub use generational::GenerationalCacheConfig;
pub use pool::{PoolConfig, ShardedPoolConfig};
