//! Object Pool Usage Examples
//!
//! This example shows how to recycle expensive buffers with `Pool`, how a
//! custom `PoolManager` controls reuse, and how `ShardedPool` spreads threads
//! over independent shards.
//!
//! Run with: cargo run --example pool_usage

extern crate reuse_rs;

use reuse_rs::config::ShardedPoolConfig;
use reuse_rs::{FnManager, Pool, PoolManager, ShardedPool};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

/// Reuses buffers that did not grow beyond `max_capacity`.
struct BufferManager {
    size: usize,
    max_capacity: usize,
    created: AtomicUsize,
}

impl PoolManager<Vec<u8>> for BufferManager {
    fn create(&self) -> Vec<u8> {
        self.created.fetch_add(1, Ordering::Relaxed);
        Vec::with_capacity(self.size)
    }

    fn can_reuse(&self, value: &Vec<u8>) -> bool {
        value.capacity() <= self.max_capacity
    }

    fn prepare_for_reuse(&self, value: &mut Vec<u8>) -> bool {
        value.clear();
        true
    }
}

fn main() {
    println!("Object Pool Usage Examples");
    println!("==========================\n");

    basic_usage();
    println!();

    custom_manager();
    println!();

    sharded_usage();
}

fn basic_usage() {
    println!("1. Basic Acquire / Release");
    println!("   ------------------------");

    let pool: Pool<String, _> = Pool::new(
        NonZeroUsize::new(4).unwrap(),
        FnManager::new(|| String::with_capacity(128)),
    );

    for line in ["alpha", "beta", "gamma", "delta", "epsilon"] {
        let mut s = pool.acquire();
        s.clear();
        s.push_str(line);
        println!("   formatted {:<8} in buffer at {:p}", s, s.as_ptr());
        pool.release(s);
    }

    let stats = pool.stats();
    println!(
        "   acquires: {}, creates: {}, reuse rate: {:.0}%",
        stats.acquires,
        stats.creates,
        stats.reuse_rate() * 100.0
    );
}

fn custom_manager() {
    println!("2. Custom PoolManager");
    println!("   -------------------");

    let pool = Pool::new(
        NonZeroUsize::new(8).unwrap(),
        BufferManager {
            size: 1024,
            max_capacity: 4096,
            created: AtomicUsize::new(0),
        },
    );

    // A buffer that grew too large is destroyed on its next acquire.
    let mut big = pool.acquire();
    big.resize(64 * 1024, 0);
    pool.release(big);
    let small = pool.acquire();
    println!("   oversized buffer replaced, new capacity: {}", small.capacity());
    pool.release(small);

    let stats = pool.stats();
    println!(
        "   created: {}, destroyed: {}, parked: {}",
        pool.manager().created.load(Ordering::Relaxed),
        stats.destroyed,
        pool.idle()
    );
}

fn sharded_usage() {
    println!("3. Sharded Pool Across Threads");
    println!("   ----------------------------");

    let config = ShardedPoolConfig::new(NonZeroUsize::new(64).unwrap());
    let pool: ShardedPool<Vec<u8>, _> =
        ShardedPool::init(config, FnManager::new(|| vec![0u8; 4096]));

    let start = Instant::now();
    thread::scope(|scope| {
        for _ in 0..8 {
            let handle = pool.handle();
            scope.spawn(move || {
                for i in 0..10_000 {
                    let mut buf = handle.acquire();
                    buf[0] = i as u8;
                    handle.release(buf);
                }
            });
        }
    });
    let elapsed = start.elapsed();

    println!(
        "   {} shards x {} slots, 80000 cycles in {:?}",
        pool.shard_count(),
        pool.shard_capacity(),
        elapsed
    );
    for shard in 0..pool.shard_count() {
        if let Some(stats) = pool.shard_stats(shard) {
            println!(
                "   shard {:>2}: acquires {:>6}, creates {:>3}",
                shard, stats.acquires, stats.creates
            );
        }
    }
    let total = pool.stats();
    println!("   total creates: {} (reuse {:.2}%)", total.creates, total.reuse_rate() * 100.0);
}
