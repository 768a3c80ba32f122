//! Pool Statistics

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::iter::Sum;
use core::ops::{Add, AddAssign};

/// Point-in-time snapshot of a pool's lifetime counters.
///
/// Counters are monotonic and never reset. Snapshots of several pools (or
/// shards) add up field by field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Payloads built by the manager because nothing reusable was parked.
    pub creates: u64,
    /// Calls to `acquire`.
    pub acquires: u64,
    /// Calls to `release`.
    pub releases: u64,
    /// Payloads handed to the manager for destruction.
    pub destroyed: u64,
}

impl PoolStats {
    /// Acquires served from parked payloads instead of creation.
    pub fn recycled(&self) -> u64 {
        self.acquires.saturating_sub(self.creates)
    }

    /// Fraction of acquires served by recycling, or 0.0 before the first one.
    pub fn reuse_rate(&self) -> f64 {
        if self.acquires > 0 {
            self.recycled() as f64 / self.acquires as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a report map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        metrics.insert("creates".to_string(), self.creates as f64);
        metrics.insert("acquires".to_string(), self.acquires as f64);
        metrics.insert("releases".to_string(), self.releases as f64);
        metrics.insert("destroyed".to_string(), self.destroyed as f64);
        metrics.insert("recycled".to_string(), self.recycled() as f64);
        metrics.insert("reuse_rate".to_string(), self.reuse_rate());
        metrics
    }
}

impl Add for PoolStats {
    type Output = PoolStats;

    fn add(mut self, rhs: PoolStats) -> PoolStats {
        self += rhs;
        self
    }
}

impl AddAssign for PoolStats {
    fn add_assign(&mut self, rhs: PoolStats) {
        self.creates += rhs.creates;
        self.acquires += rhs.acquires;
        self.releases += rhs.releases;
        self.destroyed += rhs.destroyed;
    }
}

impl Sum for PoolStats {
    fn sum<I: Iterator<Item = PoolStats>>(iter: I) -> PoolStats {
        iter.fold(PoolStats::default(), Add::add)
    }
}
