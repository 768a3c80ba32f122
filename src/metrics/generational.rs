//! Generational Cache Metrics
//!
//! Metrics specific to the two-generation cache: where hits land, and how
//! entries move between the young and old generations.

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Generational cache metrics (extends [`CoreCacheMetrics`]).
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationalCacheMetrics {
    /// Core metrics common to all caches
    pub core: CoreCacheMetrics,

    /// Number of entries currently in the young generation
    pub young_size: u64,

    /// Number of entries currently in the old generation
    pub old_size: u64,

    /// Capacity of the old generation
    pub old_capacity: u64,

    /// Promotions from young to old
    pub promotions: u64,

    /// Demotions from old back to young
    pub demotions: u64,

    /// Hits served from the young generation
    pub young_hits: u64,

    /// Hits served from the old generation
    pub old_hits: u64,

    /// Entries dropped because their weak value was gone
    pub expired: u64,
}

impl GenerationalCacheMetrics {
    /// Creates zeroed metrics for a cache whose old generation holds
    /// `old_capacity` entries.
    pub fn new(old_capacity: u64) -> Self {
        Self {
            core: CoreCacheMetrics::new(),
            young_size: 0,
            old_size: 0,
            old_capacity,
            promotions: 0,
            demotions: 0,
            young_hits: 0,
            old_hits: 0,
            expired: 0,
        }
    }

    /// Records a hit in the young generation.
    pub fn record_young_hit(&mut self) {
        self.core.record_hit();
        self.young_hits += 1;
    }

    /// Records a hit in the old generation.
    pub fn record_old_hit(&mut self) {
        self.core.record_hit();
        self.old_hits += 1;
    }

    /// Records a promotion from young to old.
    pub fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    /// Records a demotion from old to young.
    pub fn record_demotion(&mut self) {
        self.demotions += 1;
    }

    /// Records an entry dropped because its value was no longer available.
    pub fn record_expired(&mut self) {
        self.expired += 1;
    }

    /// Updates the generation sizes.
    pub fn update_generation_sizes(&mut self, young_size: u64, old_size: u64) {
        self.young_size = young_size;
        self.old_size = old_size;
    }

    /// Share of hits served by the old generation, or 0.0 without hits.
    pub fn old_hit_ratio(&self) -> f64 {
        if self.core.cache_hits > 0 {
            self.old_hits as f64 / self.core.cache_hits as f64
        } else {
            0.0
        }
    }

    /// Fill level of the old generation.
    pub fn old_utilization(&self) -> f64 {
        if self.old_capacity > 0 {
            self.old_size as f64 / self.old_capacity as f64
        } else {
            0.0
        }
    }

    /// Converts the metrics to a report map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        metrics.insert("young_size".to_string(), self.young_size as f64);
        metrics.insert("old_size".to_string(), self.old_size as f64);
        metrics.insert("old_capacity".to_string(), self.old_capacity as f64);
        metrics.insert("old_utilization".to_string(), self.old_utilization());

        metrics.insert("promotions".to_string(), self.promotions as f64);
        metrics.insert("demotions".to_string(), self.demotions as f64);
        metrics.insert("expired".to_string(), self.expired as f64);

        metrics.insert("young_hits".to_string(), self.young_hits as f64);
        metrics.insert("old_hits".to_string(), self.old_hits as f64);
        metrics.insert("old_hit_ratio".to_string(), self.old_hit_ratio());

        if self.core.requests > 0 {
            metrics.insert(
                "promotion_rate".to_string(),
                self.promotions as f64 / self.core.requests as f64,
            );
        }

        metrics
    }
}

impl CacheMetrics for GenerationalCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "Generational"
    }
}
