//! Configuration for the generational cache.

use crate::error::ConfigError;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for a [`GenerationalCache`](crate::GenerationalCache).
///
/// The total capacity is split between a young generation, where every new
/// key starts, and an old generation for keys that proved themselves by
/// collecting `promotion_threshold` hits.
///
/// # Examples
///
/// ```
/// use reuse_rs::config::GenerationalCacheConfig;
/// use core::num::NonZeroUsize;
///
/// let config = GenerationalCacheConfig {
///     capacity: NonZeroUsize::new(100).unwrap(),
///     old_ratio: 0.8,
///     promotion_threshold: 3,
///     min_capacity: NonZeroUsize::new(2).unwrap(),
/// };
/// assert!(config.validate().is_ok());
///
/// let (young, old) = config.generation_capacities();
/// assert_eq!((young.get(), old.get()), (20, 80));
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GenerationalCacheConfig {
    /// Total number of entries across both generations.
    pub capacity: NonZeroUsize,

    /// Share of the capacity given to the old generation, strictly between 0 and 1.
    pub old_ratio: f64,

    /// Hits a young entry needs before it is promoted.
    pub promotion_threshold: u32,

    /// Floor applied to `capacity` when the cache is built.
    pub min_capacity: NonZeroUsize,
}

impl GenerationalCacheConfig {
    /// Default share of the capacity reserved for the old generation.
    pub const DEFAULT_OLD_RATIO: f64 = 0.75;

    /// Default number of hits before promotion.
    pub const DEFAULT_PROMOTION_THRESHOLD: u32 = 10;

    /// Smallest capacity that leaves room for one entry per generation.
    pub const MIN_CAPACITY: usize = 2;

    /// Creates a configuration with default ratio, threshold and floor.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            old_ratio: Self::DEFAULT_OLD_RATIO,
            promotion_threshold: Self::DEFAULT_PROMOTION_THRESHOLD,
            min_capacity: NonZeroUsize::MIN,
        }
    }

    /// Sets the old generation share.
    pub fn with_old_ratio(mut self, old_ratio: f64) -> Self {
        self.old_ratio = old_ratio;
        self
    }

    /// Sets the promotion threshold.
    pub fn with_promotion_threshold(mut self, promotion_threshold: u32) -> Self {
        self.promotion_threshold = promotion_threshold;
        self
    }

    /// Sets the capacity floor.
    pub fn with_min_capacity(mut self, min_capacity: NonZeroUsize) -> Self {
        self.min_capacity = min_capacity;
        self
    }

    /// Checks the parameters that the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.old_ratio > 0.0 && self.old_ratio < 1.0) {
            return Err(ConfigError::InvalidOldRatio(self.old_ratio));
        }
        if self.promotion_threshold == 0 {
            return Err(ConfigError::ZeroPromotionThreshold);
        }
        Ok(())
    }

    /// Capacity after clamping to the configured and structural minimums.
    pub fn effective_capacity(&self) -> NonZeroUsize {
        let clamped = self
            .capacity
            .get()
            .max(self.min_capacity.get())
            .max(Self::MIN_CAPACITY);
        NonZeroUsize::new(clamped).unwrap_or(NonZeroUsize::MIN)
    }

    /// Splits the effective capacity into `(young, old)` generation sizes.
    ///
    /// Each generation gets at least one slot.
    pub fn generation_capacities(&self) -> (NonZeroUsize, NonZeroUsize) {
        let total = self.effective_capacity().get();
        #[allow(clippy::cast_possible_truncation)]
        let old = ((total as f64) * self.old_ratio) as usize;
        let old = old.clamp(1, total - 1);
        let young = total - old;
        (
            NonZeroUsize::new(young).unwrap_or(NonZeroUsize::MIN),
            NonZeroUsize::new(old).unwrap_or(NonZeroUsize::MIN),
        )
    }
}

impl fmt::Debug for GenerationalCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationalCacheConfig")
            .field("capacity", &self.capacity)
            .field("old_ratio", &self.old_ratio)
            .field("promotion_threshold", &self.promotion_threshold)
            .field("min_capacity", &self.min_capacity)
            .finish()
    }
}
