//! Sharded Object Pool
//!
//! A single [`Pool`] is lock-free, but every thread still hammers the same two
//! stack heads. [`ShardedPool`] splits the capacity across N independent pools
//! and gives each caller a [`ShardHandle`] bound to one of them, so callers
//! that hold different handles rarely touch the same cache line.
//!
//! Handles are bound round-robin from one shared counter: the first handle
//! goes to shard 0, the next to shard 1, and so on. Binding follows the order
//! in which callers ask for handles, which spreads them evenly regardless of
//! how thread ids or addresses happen to hash.
//!
//! # Examples
//!
//! ```
//! use reuse_rs::config::ShardedPoolConfig;
//! use reuse_rs::pool::FnManager;
//! use reuse_rs::ShardedPool;
//! use core::num::NonZeroUsize;
//!
//! let config = ShardedPoolConfig::new(NonZeroUsize::new(64).unwrap())
//!     .with_shards(NonZeroUsize::new(4).unwrap());
//! let pool: ShardedPool<Vec<u8>, _> =
//!     ShardedPool::init(config, FnManager::new(|| vec![0u8; 512]));
//!
//! std::thread::scope(|s| {
//!     for _ in 0..4 {
//!         let handle = pool.handle();
//!         s.spawn(move || {
//!             let buf = handle.acquire();
//!             handle.release(buf);
//!         });
//!     }
//! });
//!
//! assert_eq!(pool.stats().acquires, 4);
//! ```

extern crate alloc;

use crate::config::{PoolConfig, ShardedPoolConfig};
use crate::error::ConfigError;
use crate::metrics::PoolStats;
use crate::pool::{Pool, PoolManager};
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;
use core::num::NonZeroUsize;
use core::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Shard count used when none is configured and parallelism is unknown.
const FALLBACK_SHARDS: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Shard count matching the machine's available parallelism.
#[cfg(feature = "std")]
pub fn default_shard_count() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(FALLBACK_SHARDS)
}

/// Shard count used when no parallelism information is available.
#[cfg(not(feature = "std"))]
pub fn default_shard_count() -> NonZeroUsize {
    FALLBACK_SHARDS
}

/// N independent bounded pools sharing one manager.
pub struct ShardedPool<T, M: PoolManager<T>> {
    shards: Box<[Pool<T, Arc<M>>]>,
    /// Next shard to bind a handle to, modulo the shard count.
    next_shard: AtomicUsize,
    manager: Arc<M>,
}

impl<T, M: PoolManager<T>> ShardedPool<T, M> {
    /// Creates `shards` pools of `shard_capacity` payloads each.
    pub fn new(shards: NonZeroUsize, shard_capacity: NonZeroUsize, manager: M) -> Self {
        let manager = Arc::new(manager);
        let shards: Box<[Pool<T, Arc<M>>]> = (0..shards.get())
            .map(|_| Pool::init(PoolConfig { capacity: shard_capacity }, Arc::clone(&manager)))
            .collect();

        debug!(
            shards = shards.len(),
            shard_capacity = shard_capacity.get(),
            "created sharded object pool"
        );

        ShardedPool {
            shards,
            next_shard: AtomicUsize::new(0),
            manager,
        }
    }

    /// Creates a sharded pool from a configuration.
    ///
    /// The total capacity is split `ceil(capacity / shards)` per shard, so the
    /// shards together never hold less than the configured capacity.
    pub fn init(config: ShardedPoolConfig, manager: M) -> Self {
        let shards = config.shards.unwrap_or_else(default_shard_count);
        Self::new(shards, config.shard_capacity(shards), manager)
    }

    /// Creates a sharded pool from raw numbers, rejecting zero for either.
    pub fn with_capacity(capacity: usize, shards: usize, manager: M) -> Result<Self, ConfigError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(ConfigError::ZeroCapacity)?;
        let shards = NonZeroUsize::new(shards).ok_or(ConfigError::ZeroShards)?;
        Ok(Self::init(
            ShardedPoolConfig::new(capacity).with_shards(shards),
            manager,
        ))
    }

    /// Returns a handle bound to the next shard in round-robin order.
    ///
    /// Obtain one handle per worker and keep it; every call to `handle()`
    /// advances the binding counter.
    pub fn handle(&self) -> ShardHandle<'_, T, M> {
        let shard = self.next_shard.fetch_add(1, Ordering::Relaxed) % self.shards.len();
        ShardHandle { pool: self, shard }
    }

    /// Number of shards.
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Capacity of each individual shard.
    #[inline]
    pub fn shard_capacity(&self) -> usize {
        self.shards.first().map_or(0, Pool::capacity)
    }

    /// Sum of all shard capacities.
    pub fn capacity(&self) -> usize {
        self.shards.iter().map(Pool::capacity).sum()
    }

    /// Payloads currently parked across all shards.
    pub fn idle(&self) -> usize {
        self.shards.iter().map(Pool::idle).sum()
    }

    /// Counters of a single shard, or `None` if `shard` is out of range.
    pub fn shard_stats(&self, shard: usize) -> Option<PoolStats> {
        self.shards.get(shard).map(Pool::stats)
    }

    /// Sum of every shard's counters.
    ///
    /// Each shard is read separately, so under concurrent use the result is
    /// a close approximation rather than one consistent instant.
    pub fn stats(&self) -> PoolStats {
        self.shards.iter().map(Pool::stats).sum()
    }

    /// Returns the manager shared by every shard.
    #[inline]
    pub fn manager(&self) -> &M {
        &self.manager
    }
}

impl<T, M: PoolManager<T>> fmt::Debug for ShardedPool<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedPool")
            .field("shards", &self.shard_count())
            .field("shard_capacity", &self.shard_capacity())
            .field("stats", &self.stats())
            .finish()
    }
}

/// A caller's binding to one shard of a [`ShardedPool`].
///
/// Handles are cheap to copy and may be moved to other threads; a copy keeps
/// the same shard.
pub struct ShardHandle<'a, T, M: PoolManager<T>> {
    pool: &'a ShardedPool<T, M>,
    shard: usize,
}

impl<'a, T, M: PoolManager<T>> ShardHandle<'a, T, M> {
    /// Acquires a payload from the bound shard.
    #[inline]
    pub fn acquire(&self) -> T {
        self.pool.shards[self.shard].acquire()
    }

    /// Releases a payload into the bound shard.
    #[inline]
    pub fn release(&self, value: T) {
        self.pool.shards[self.shard].release(value)
    }

    /// Index of the bound shard.
    #[inline]
    pub fn shard_index(&self) -> usize {
        self.shard
    }

    /// Counters of the bound shard.
    pub fn stats(&self) -> PoolStats {
        self.pool.shards[self.shard].stats()
    }
}

impl<T, M: PoolManager<T>> Clone for ShardHandle<'_, T, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, M: PoolManager<T>> Copy for ShardHandle<'_, T, M> {}

impl<T, M: PoolManager<T>> fmt::Debug for ShardHandle<'_, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardHandle")
            .field("shard", &self.shard)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::FnManager;
    use alloc::vec::Vec;

    extern crate std;
    use std::thread;

    fn zero() -> u64 {
        0
    }

    fn counter_pool(capacity: usize, shards: usize) -> ShardedPool<u64, FnManager<fn() -> u64>> {
        ShardedPool::with_capacity(capacity, shards, FnManager::new(zero as fn() -> u64)).unwrap()
    }

    #[test]
    fn test_zero_parameters_rejected() {
        let zero_shards = ShardedPool::<u8, _>::with_capacity(8, 0, FnManager::new(|| 0u8));
        assert_eq!(zero_shards.err(), Some(ConfigError::ZeroShards));

        let zero_capacity = ShardedPool::<u8, _>::with_capacity(0, 2, FnManager::new(|| 0u8));
        assert_eq!(zero_capacity.err(), Some(ConfigError::ZeroCapacity));
    }

    #[test]
    fn test_capacity_rounds_up_per_shard() {
        let pool = counter_pool(10, 4);
        assert_eq!(pool.shard_count(), 4);
        assert_eq!(pool.shard_capacity(), 3);
        assert_eq!(pool.capacity(), 12);
        assert!(pool.capacity() >= 10);
    }

    #[test]
    fn test_handles_bind_round_robin() {
        let pool = counter_pool(8, 3);
        let bound: Vec<usize> = (0..7).map(|_| pool.handle().shard_index()).collect();
        assert_eq!(bound, [0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_handle_stays_on_its_shard() {
        let pool = counter_pool(8, 2);
        let _first = pool.handle();
        let second = pool.handle();

        let value = second.acquire();
        second.release(value);
        let _ = second.acquire();

        assert_eq!(pool.shard_stats(0), Some(PoolStats::default()));
        let stats = pool.shard_stats(1).unwrap();
        assert_eq!(stats.acquires, 2);
        assert_eq!(stats.creates, 1);
        assert_eq!(second.stats(), stats);
        assert_eq!(pool.shard_stats(2), None);
    }

    #[test]
    fn test_default_shard_count() {
        let pool: ShardedPool<u8, _> = ShardedPool::init(
            ShardedPoolConfig::new(NonZeroUsize::new(4).unwrap()),
            FnManager::new(|| 1u8),
        );
        assert_eq!(pool.shard_count(), default_shard_count().get());
        assert!(pool.capacity() >= 4);
    }

    #[test]
    fn test_aggregated_stats_equal_sum_of_shards() {
        let pool = counter_pool(32, 4);

        thread::scope(|s| {
            for _ in 0..8 {
                let handle = pool.handle();
                s.spawn(move || {
                    for _ in 0..500 {
                        let a = handle.acquire();
                        let b = handle.acquire();
                        handle.release(a);
                        handle.release(b);
                    }
                });
            }
        });

        let total = pool.stats();
        let summed: PoolStats = (0..pool.shard_count())
            .filter_map(|i| pool.shard_stats(i))
            .sum();
        assert_eq!(total, summed);
        assert_eq!(total.acquires, 8 * 2 * 500);
        assert_eq!(total.releases, total.acquires);
        assert!(pool.idle() <= pool.capacity());
    }
}
