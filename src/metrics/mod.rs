//! Metrics
//!
//! Caches report through the [`CacheMetrics`] trait, which returns a
//! `BTreeMap<String, f64>`. A BTreeMap keeps metric names in a stable order,
//! so two reports of the same state print and compare identically.
//!
//! Pools report through [`PoolStats`], a plain snapshot of four monotonic
//! counters that can be summed across shards.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod generational;
pub mod pool;

pub use generational::GenerationalCacheMetrics;
pub use pool::PoolStats;

/// Counters every cache keeps regardless of its eviction scheme.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoreCacheMetrics {
    /// Total number of lookups made through `get`.
    pub requests: u64,

    /// Lookups that found their key.
    pub cache_hits: u64,

    /// Entries created by inserting a new key.
    pub insertions: u64,

    /// Values replaced in place for an existing key.
    pub updates: u64,

    /// Entries freed because the cache ran out of room.
    pub evictions: u64,

    /// Entries freed by an explicit remove.
    pub removals: u64,
}

impl CoreCacheMetrics {
    /// Creates zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup that found its key.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that missed.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records the creation of a new entry.
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records an in-place value replacement.
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records a capacity eviction.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Records an explicit removal.
    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    /// Fraction of requests that hit, or 0.0 before the first request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of requests that missed, or 0.0 before the first request.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a report map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("updates".to_string(), self.updates as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("removals".to_string(), self.removals as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Uniform metrics reporting for caches.
pub trait CacheMetrics {
    /// Returns all metrics as name/value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Short name identifying the cache scheme, e.g. `"Generational"`.
    fn algorithm_name(&self) -> &'static str;
}
