//! Concurrent Cache Usage Examples
//!
//! This example demonstrates sharing a generational cache between threads.
//!
//! Run with: cargo run --example concurrent_usage --features concurrent

extern crate reuse_rs;

use reuse_rs::config::GenerationalCacheConfig;
use reuse_rs::metrics::CacheMetrics;
use reuse_rs::SyncGenerationalCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("Concurrent Cache Usage Examples");
    println!("================================\n");

    basic_concurrent_usage();
    println!();

    zero_copy_access();
}

fn basic_concurrent_usage() {
    println!("1. Basic Concurrent Usage");
    println!("   -----------------------");

    let config = GenerationalCacheConfig::new(NonZeroUsize::new(1_000).unwrap())
        .with_promotion_threshold(3);
    let cache: Arc<SyncGenerationalCache<u64, String>> =
        match SyncGenerationalCache::init(config, None) {
            Ok(cache) => Arc::new(cache),
            Err(err) => {
                eprintln!("   invalid configuration: {}", err);
                return;
            }
        };

    let start = Instant::now();
    let handles: Vec<_> = (0..8u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..5_000u64 {
                    // Each thread shares a hot range and scans its own keys.
                    let key = if i % 2 == 0 { i % 100 } else { t * 1_000_000 + i };
                    if cache.get(&key).is_none() {
                        cache.put(key, format!("value-{}", key));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            eprintln!("   worker panicked");
        }
    }

    let report = cache.metrics();
    println!("   8 threads x 5000 ops in {:?}", start.elapsed());
    println!(
        "   hit rate: {:.1}%, promotions: {}, demotions: {}",
        report["hit_rate"] * 100.0,
        report["promotions"],
        report["demotions"]
    );
    let hot = (0..100).filter(|key| cache.contains_key(key)).count();
    println!("   hot keys resident: {}/100, size: {}", hot, cache.len());
}

fn zero_copy_access() {
    println!("2. Zero-Copy Access with get_with()");
    println!("   ----------------------------------");

    let cache: SyncGenerationalCache<&str, Vec<u8>> =
        SyncGenerationalCache::new(NonZeroUsize::new(16).unwrap());
    cache.put("blob", vec![0u8; 1024]);

    let len = cache.get_with(&"blob", |data| data.len());
    println!("   read {:?} bytes without cloning", len);

    cache.get_mut_with(&"blob", |data| data.truncate(16));
    println!("   truncated in place, now {:?} bytes", cache.get_with(&"blob", Vec::len));
}
