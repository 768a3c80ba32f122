//! Construction Errors
//!
//! Pools and caches validate their configuration before anything is
//! allocated, so a failed constructor never leaves a partially built
//! instance behind. Runtime operations do not fail: the pool absorbs
//! pressure by creating or destroying payloads, and the cache reports
//! misses as `None`.

use thiserror::Error;

/// Error returned when a pool or cache configuration is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// A pool or cache was configured with zero capacity.
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    /// A sharded pool was configured with zero shards.
    #[error("shard count must be greater than zero")]
    ZeroShards,

    /// The generational cache promotion threshold was zero.
    #[error("promotion threshold must be at least one hit")]
    ZeroPromotionThreshold,

    /// The old generation ratio was not strictly between 0 and 1.
    #[error("old generation ratio must lie strictly between 0 and 1, got {0}")]
    InvalidOldRatio(f64),
}
