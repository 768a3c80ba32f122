// Aliasing checks for the intrusive lists and the lock-free stacks.
//
// Cache entries are linked into two lists and a hash chain at once, and pool
// nodes move between two CAS stacks. These tests drive every relinking path
// so Miri can check that no reference outlives the pointer it was made from.
//
// Run with: cargo +nightly miri test --test test_miri_stacked_borrows

#![cfg(test)]

use reuse_rs::config::GenerationalCacheConfig;
use reuse_rs::{FnManager, GenerationalCache, Pool, ShardedPool};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

fn make_cache(cap: usize, threshold: u32) -> GenerationalCache<String, Vec<u32>> {
    let config = GenerationalCacheConfig::new(NonZeroUsize::new(cap).unwrap())
        .with_old_ratio(0.5)
        .with_promotion_threshold(threshold);
    GenerationalCache::init(config, None).unwrap()
}

/// Promotion and demotion relink the same entry through both lists while a
/// value reference is handed out right after.
#[test]
fn test_promote_demote_churn() {
    let mut cache = make_cache(4, 1);
    for round in 0..3u32 {
        for key in ["a", "b", "c", "d"] {
            cache.put(key.to_string(), vec![round]);
            let value = cache.get(key).map(|v| v[0]);
            assert_eq!(value, Some(round));
        }
    }
    assert!(cache.metrics().demotions > 0);
    assert_eq!(cache.len(), cache.young_len() + cache.old_len());
}

/// A mutable value reference obtained through `get_mut` must stay valid
/// after the entry was moved to the head of its list.
#[test]
fn test_get_mut_after_relink() {
    let mut cache = make_cache(4, 2);
    cache.put("x".to_string(), Vec::new());
    cache.put("y".to_string(), Vec::new());
    for i in 0..4 {
        if let Some(v) = cache.get_mut("x") {
            v.push(i);
        }
        cache.get("y");
    }
    assert_eq!(cache.peek("x"), Some(&vec![0, 1, 2, 3]));
}

/// Eviction frees entries that were reached through hash chains.
#[test]
fn test_evict_remove_and_drop() {
    let mut cache = make_cache(2, 3);
    for i in 0..8 {
        cache.put(format!("k{}", i), vec![i]);
    }
    assert_eq!(cache.remove("k7"), Some(vec![7]));
    cache.clear();
    cache.put("last".to_string(), vec![]);
    drop(cache);
}

/// Pool nodes cycle between the free and occupied stacks from two threads.
#[test]
fn test_pool_nodes_cross_threads() {
    let pool = Arc::new(Pool::<Box<u64>, _>::new(
        NonZeroUsize::new(2).unwrap(),
        FnManager::new(|| Box::new(0u64)),
    ));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for i in 0..20 {
                    let mut value = pool.acquire();
                    *value = i;
                    pool.release(value);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(pool.idle() <= 2);
}

#[test]
fn test_sharded_handles() {
    let pool: ShardedPool<Vec<u8>, _> =
        ShardedPool::with_capacity(4, 2, FnManager::new(Vec::new)).unwrap();
    let a = pool.handle();
    let b = pool.handle();
    let buf = a.acquire();
    b.release(buf);
    assert_eq!(pool.shard_stats(b.shard_index()).unwrap().releases, 1);
    drop(pool);
}
