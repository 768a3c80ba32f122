//! Configuration for bounded and sharded object pools.

use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for a [`Pool`](crate::Pool).
///
/// # Examples
///
/// ```
/// use reuse_rs::config::PoolConfig;
/// use reuse_rs::pool::{FnManager, Pool};
/// use core::num::NonZeroUsize;
///
/// let config = PoolConfig {
///     capacity: NonZeroUsize::new(64).unwrap(),
/// };
/// let pool: Pool<Vec<u8>, _> = Pool::init(config, FnManager::new(|| vec![0u8; 4096]));
/// assert_eq!(pool.capacity(), 64);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of payloads parked in the pool at once.
    pub capacity: NonZeroUsize,
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Configuration for a [`ShardedPool`](crate::ShardedPool).
///
/// `capacity` is the total across all shards; each shard gets
/// `ceil(capacity / shards)` so the sum never falls short of it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ShardedPoolConfig {
    /// Total number of payloads parked across all shards.
    pub capacity: NonZeroUsize,

    /// Number of shards. `None` uses the available parallelism.
    pub shards: Option<NonZeroUsize>,
}

impl ShardedPoolConfig {
    /// Creates a configuration with the default shard count.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            shards: None,
        }
    }

    /// Sets an explicit shard count.
    pub fn with_shards(mut self, shards: NonZeroUsize) -> Self {
        self.shards = Some(shards);
        self
    }

    /// Capacity given to each shard when split `shards` ways.
    pub fn shard_capacity(&self, shards: NonZeroUsize) -> NonZeroUsize {
        let per_shard = self.capacity.get().div_ceil(shards.get());
        NonZeroUsize::new(per_shard).unwrap_or(NonZeroUsize::MIN)
    }
}

impl fmt::Debug for ShardedPoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedPoolConfig")
            .field("capacity", &self.capacity)
            .field("shards", &self.shards)
            .finish()
    }
}
