//! Bounded Object Pool
//!
//! A lock-free pool that recycles expensive payloads (byte buffers, parsers,
//! connections) instead of rebuilding them for every use. The pool never makes
//! a caller wait and never reports failure:
//!
//! - **Shortage** is absorbed by creation: `acquire` falls back to
//!   [`PoolManager::create`] when nothing reusable is parked.
//! - **Surplus** is absorbed by destruction: `release` hands the payload to
//!   [`PoolManager::destroy`] when all `capacity` slots are already occupied.
//!
//! # Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Pool<T, M>                             │
//! │                                                                  │
//! │   nodes: [PoolNode; capacity]   (allocated once, never freed)    │
//! │                                                                  │
//! │   free stack      ──▶ [ ] ──▶ [ ] ──▶ [ ]     (empty slots)       │
//! │   occupied stack  ──▶ [T] ──▶ [T]             (parked payloads)   │
//! │                                                                  │
//! │   acquire: pop occupied ─▶ take payload ─▶ push node to free     │
//! │   release: pop free ─▶ store payload ─▶ push node to occupied    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every node sits on exactly one of the two stacks, or is held by the one
//! thread that just popped it, so the number of parked payloads can never
//! exceed `capacity` no matter how threads interleave.
//!
//! # Examples
//!
//! ```
//! use reuse_rs::pool::{FnManager, Pool};
//! use core::num::NonZeroUsize;
//!
//! let pool: Pool<Vec<u8>, _> = Pool::new(
//!     NonZeroUsize::new(4).unwrap(),
//!     FnManager::new(|| Vec::<u8>::with_capacity(1024)),
//! );
//!
//! let buf = pool.acquire();     // created: nothing parked yet
//! pool.release(buf);            // parked for the next caller
//! let again = pool.acquire();   // recycled
//! assert_eq!(again.capacity(), 1024);
//!
//! let stats = pool.stats();
//! assert_eq!(stats.creates, 1);
//! assert_eq!(stats.acquires, 2);
//! ```

extern crate alloc;

use crate::config::PoolConfig;
use crate::error::ConfigError;
use crate::metrics::PoolStats;
use crate::stack::{CasStack, PoolNode};
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;
use core::num::NonZeroUsize;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Caller-supplied lifecycle hooks for pooled payloads.
///
/// Only [`create`](PoolManager::create) is required. The defaults treat every
/// payload as reusable and destroy by dropping.
pub trait PoolManager<T> {
    /// Builds a fresh payload. Called whenever no parked payload is reusable.
    fn create(&self) -> T;

    /// Disposes of a payload the pool will not keep.
    fn destroy(&self, value: T) {
        drop(value);
    }

    /// Decides, at acquire time, whether a parked payload may be handed out.
    fn can_reuse(&self, value: &T) -> bool {
        let _ = value;
        true
    }

    /// Resets a released payload before it is parked (e.g. zeroing a buffer).
    ///
    /// Returning `false` destroys the payload instead of recycling it.
    fn prepare_for_reuse(&self, value: &mut T) -> bool {
        let _ = value;
        true
    }
}

impl<T, M: PoolManager<T> + ?Sized> PoolManager<T> for Arc<M> {
    #[inline]
    fn create(&self) -> T {
        (**self).create()
    }

    #[inline]
    fn destroy(&self, value: T) {
        (**self).destroy(value)
    }

    #[inline]
    fn can_reuse(&self, value: &T) -> bool {
        (**self).can_reuse(value)
    }

    #[inline]
    fn prepare_for_reuse(&self, value: &mut T) -> bool {
        (**self).prepare_for_reuse(value)
    }
}

/// Adapts a plain factory closure into a [`PoolManager`].
pub struct FnManager<F> {
    factory: F,
}

impl<F> FnManager<F> {
    /// Wraps `factory`; every payload is considered reusable.
    pub fn new(factory: F) -> Self {
        FnManager { factory }
    }
}

impl<T, F: Fn() -> T> PoolManager<T> for FnManager<F> {
    #[inline]
    fn create(&self) -> T {
        (self.factory)()
    }
}

impl<F> fmt::Debug for FnManager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnManager").finish_non_exhaustive()
    }
}

/// Monotonic counters shared by all threads using a pool.
#[derive(Default)]
struct PoolCounters {
    creates: AtomicU64,
    acquires: AtomicU64,
    releases: AtomicU64,
    destroyed: AtomicU64,
}

impl PoolCounters {
    fn snapshot(&self) -> PoolStats {
        PoolStats {
            creates: self.creates.load(Ordering::Relaxed),
            acquires: self.acquires.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            destroyed: self.destroyed.load(Ordering::Relaxed),
        }
    }
}

/// A bounded, lock-free object pool.
///
/// At most `capacity` payloads are parked at any instant; payloads currently
/// held by callers are not counted, since the pool does not own them.
pub struct Pool<T, M: PoolManager<T>> {
    /// Backing storage for both stacks. Never reallocated.
    nodes: Box<[PoolNode<T>]>,
    /// Nodes with an empty payload slot.
    free: CasStack<T>,
    /// Nodes holding a payload ready for reuse.
    occupied: CasStack<T>,
    /// Approximate number of nodes on `occupied`.
    idle: AtomicUsize,
    counters: PoolCounters,
    manager: M,
}

// SAFETY: payload slots are only accessed by the thread that popped the
// owning node, and nodes are handed between threads through the CAS stacks.
unsafe impl<T: Send, M: PoolManager<T> + Sync> Sync for Pool<T, M> {}

impl<T, M: PoolManager<T>> Pool<T, M> {
    /// Creates a pool that parks at most `capacity` payloads.
    pub fn new(capacity: NonZeroUsize, manager: M) -> Self {
        let nodes: Box<[PoolNode<T>]> =
            (0..capacity.get()).map(|_| PoolNode::vacant()).collect();
        let free = CasStack::new();
        for node in nodes.iter() {
            // SAFETY: the node lives in `nodes`, which is owned by the pool
            // together with both stacks and is never reallocated.
            unsafe { free.push(NonNull::from(node)) };
        }

        debug!(capacity = capacity.get(), "created object pool");

        Pool {
            nodes,
            free,
            occupied: CasStack::new(),
            idle: AtomicUsize::new(0),
            counters: PoolCounters::default(),
            manager,
        }
    }

    /// Creates a pool from a raw capacity, rejecting zero.
    pub fn with_capacity(capacity: usize, manager: M) -> Result<Self, ConfigError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(ConfigError::ZeroCapacity)?;
        Ok(Self::new(capacity, manager))
    }

    /// Creates a pool from a configuration.
    pub fn init(config: PoolConfig, manager: M) -> Self {
        Self::new(config.capacity, manager)
    }

    /// Returns a payload, recycled when possible and freshly created otherwise.
    ///
    /// Parked payloads rejected by [`PoolManager::can_reuse`] are destroyed and
    /// the search continues. Never blocks and never fails.
    pub fn acquire(&self) -> T {
        self.counters.acquires.fetch_add(1, Ordering::Relaxed);

        while let Some(node) = self.occupied.pop() {
            self.idle.fetch_sub(1, Ordering::Relaxed);
            // SAFETY: a popped node is exclusively ours until pushed back, and
            // it belongs to `self.nodes`.
            let payload = unsafe {
                let payload = node.as_ref().take();
                self.free.push(node);
                payload
            }
            .expect("occupied pool node must hold a payload");

            if self.manager.can_reuse(&payload) {
                return payload;
            }
            trace!("parked payload rejected for reuse");
            self.discard(payload);
        }

        self.counters.creates.fetch_add(1, Ordering::Relaxed);
        self.manager.create()
    }

    /// Hands a payload back to the pool.
    ///
    /// The payload is parked if it passes [`PoolManager::prepare_for_reuse`]
    /// and a free slot is available; otherwise it is destroyed.
    pub fn release(&self, mut value: T) {
        self.counters.releases.fetch_add(1, Ordering::Relaxed);

        if !self.manager.prepare_for_reuse(&mut value) {
            trace!("released payload could not be prepared for reuse");
            self.discard(value);
            return;
        }

        match self.free.pop() {
            Some(node) => {
                self.idle.fetch_add(1, Ordering::Relaxed);
                // SAFETY: a popped node is exclusively ours until pushed back,
                // and it belongs to `self.nodes`.
                unsafe {
                    let previous = node.as_ref().store(value);
                    debug_assert!(previous.is_none(), "free pool node held a payload");
                    self.occupied.push(node);
                }
            }
            None => {
                trace!(capacity = self.capacity(), "pool full, destroying payload");
                self.discard(value);
            }
        }
    }

    fn discard(&self, value: T) {
        self.counters.destroyed.fetch_add(1, Ordering::Relaxed);
        self.manager.destroy(value);
    }
}

impl<T, M: PoolManager<T>> Pool<T, M> {
    /// Returns the maximum number of payloads the pool can park.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of payloads parked right now.
    ///
    /// The value is exact only when no other thread is using the pool.
    #[inline]
    pub fn idle(&self) -> usize {
        self.idle.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of the pool's lifetime counters.
    #[inline]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot()
    }

    /// Returns the manager that creates and destroys payloads.
    #[inline]
    pub fn manager(&self) -> &M {
        &self.manager
    }
}

impl<T, M: PoolManager<T>> Drop for Pool<T, M> {
    fn drop(&mut self) {
        while let Some(node) = self.occupied.pop() {
            // SAFETY: `&mut self` rules out concurrent access; the node
            // belongs to `self.nodes`, which is still alive.
            if let Some(payload) = unsafe { node.as_ref().take() } {
                self.discard(payload);
            }
        }
    }
}

impl<T, M: PoolManager<T>> fmt::Debug for Pool<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("capacity", &self.capacity())
            .field("idle", &self.idle())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    extern crate std;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    /// Hands out zeroed buffers and counts every lifecycle event.
    #[derive(Default)]
    struct BufferManager {
        created: AtomicUsize,
        destroyed: AtomicUsize,
        refuse_prepare: AtomicBool,
    }

    impl BufferManager {
        fn live(&self) -> usize {
            self.created.load(Ordering::SeqCst) - self.destroyed.load(Ordering::SeqCst)
        }
    }

    impl PoolManager<Vec<u8>> for BufferManager {
        fn create(&self) -> Vec<u8> {
            self.created.fetch_add(1, Ordering::SeqCst);
            vec![0; 16]
        }

        fn destroy(&self, value: Vec<u8>) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
            drop(value);
        }

        fn can_reuse(&self, value: &Vec<u8>) -> bool {
            value.len() == 16
        }

        fn prepare_for_reuse(&self, value: &mut Vec<u8>) -> bool {
            value.iter_mut().for_each(|b| *b = 0);
            !self.refuse_prepare.load(Ordering::SeqCst)
        }
    }

    fn buffer_pool(capacity: usize) -> Pool<Vec<u8>, BufferManager> {
        Pool::with_capacity(capacity, BufferManager::default()).unwrap()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = Pool::<u32, _>::with_capacity(0, FnManager::new(|| 0u32));
        assert_eq!(result.err(), Some(ConfigError::ZeroCapacity));
    }

    #[test]
    fn test_acquire_creates_when_empty() {
        let pool = buffer_pool(2);
        let buf = pool.acquire();
        assert_eq!(buf.len(), 16);
        assert_eq!(pool.manager().created.load(Ordering::SeqCst), 1);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_release_then_acquire_recycles() {
        let pool = buffer_pool(2);
        let mut buf = pool.acquire();
        buf[0] = 42;
        let addr = buf.as_ptr();
        pool.release(buf);
        assert_eq!(pool.idle(), 1);

        let again = pool.acquire();
        assert_eq!(again.as_ptr(), addr);
        assert_eq!(again[0], 0, "prepare_for_reuse zeroes the buffer");
        assert_eq!(pool.manager().created.load(Ordering::SeqCst), 1);

        let stats = pool.stats();
        assert_eq!(stats.creates, 1);
        assert_eq!(stats.acquires, 2);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.destroyed, 0);
    }

    #[test]
    fn test_release_beyond_capacity_destroys() {
        let pool = buffer_pool(2);
        let held: Vec<_> = (0..3).map(|_| pool.acquire()).collect();
        for buf in held {
            pool.release(buf);
        }
        assert_eq!(pool.idle(), 2);
        assert_eq!(pool.stats().destroyed, 1);
        assert_eq!(pool.manager().live(), 2);
    }

    #[test]
    fn test_unusable_payload_never_handed_back() {
        let pool = buffer_pool(2);
        pool.release(vec![1, 2, 3]);
        assert_eq!(pool.idle(), 1);

        let buf = pool.acquire();
        assert_eq!(buf.len(), 16);
        assert_eq!(pool.stats().destroyed, 1);
        assert_eq!(pool.stats().creates, 1);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_failed_prepare_destroys() {
        let pool = buffer_pool(2);
        let buf = pool.acquire();
        pool.manager().refuse_prepare.store(true, Ordering::SeqCst);
        pool.release(buf);
        assert_eq!(pool.idle(), 0);
        assert_eq!(pool.stats().destroyed, 1);
    }

    #[test]
    fn test_drop_destroys_parked_payloads() {
        let manager = Arc::new(BufferManager::default());
        {
            let pool: Pool<Vec<u8>, _> =
                Pool::new(NonZeroUsize::new(4).unwrap(), Arc::clone(&manager));
            let a = pool.acquire();
            let b = pool.acquire();
            pool.release(a);
            pool.release(b);
        }
        assert_eq!(manager.created.load(Ordering::SeqCst), 2);
        assert_eq!(manager.destroyed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fn_manager() {
        let pool = Pool::<u64, _>::init(
            PoolConfig {
                capacity: NonZeroUsize::new(1).unwrap(),
            },
            FnManager::new(|| 7u64),
        );
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.acquire(), 7);
    }

    #[test]
    fn test_concurrent_parked_never_exceeds_capacity() {
        const CAPACITY: usize = 8;
        let pool = Arc::new(buffer_pool(CAPACITY));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..2_000 {
                        let a = pool.acquire();
                        let b = pool.acquire();
                        assert_eq!(a.len(), 16);
                        pool.release(a);
                        if i % 3 != 0 {
                            pool.release(b);
                        }
                        assert!(pool.idle() <= CAPACITY);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Everything not leaked by the threads is parked.
        let stats = pool.stats();
        let leaked = 8 * (0..2_000).filter(|i| i % 3 == 0).count() as u64;
        assert!(pool.idle() <= CAPACITY);
        assert_eq!(stats.acquires, 8 * 2 * 2_000);
        assert_eq!(stats.releases, stats.acquires - leaked);
        assert_eq!(
            stats.creates - stats.destroyed,
            pool.idle() as u64 + leaked
        );
    }
}
