//! Generational Cache Usage Examples
//!
//! This example compares a plain insert-only scan against a hot working set
//! and shows how the old generation keeps frequently used entries resident.
//!
//! Run with: cargo run --example generational_usage

extern crate reuse_rs;

use reuse_rs::config::GenerationalCacheConfig;
use reuse_rs::metrics::CacheMetrics;
use reuse_rs::{Generation, GenerationalCache};
use std::num::NonZeroUsize;
use std::sync::{Arc, Weak};

fn main() {
    println!("Generational Cache Usage Examples");
    println!("=================================\n");

    lifecycle();
    println!();

    scan_resistance();
    println!();

    weak_values();
}

fn lifecycle() {
    println!("1. Entry Lifecycle");
    println!("   ---------------");

    let config = GenerationalCacheConfig::new(NonZeroUsize::new(4).unwrap())
        .with_old_ratio(0.5)
        .with_promotion_threshold(2);
    let mut cache: GenerationalCache<&str, u32> = match GenerationalCache::init(config, None) {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("   invalid configuration: {}", err);
            return;
        }
    };

    cache.put("config", 1);
    println!("   after put:     {:?}", cache.generation_of(&"config"));
    cache.get(&"config");
    println!("   after 1 hit:   {:?}", cache.generation_of(&"config"));
    cache.get(&"config");
    println!("   after 2 hits:  {:?}", cache.generation_of(&"config"));

    for key in ["a", "b", "c"] {
        cache.put(key, 0);
        cache.get(&key);
        cache.get(&key);
    }
    let demoted = cache.generation_of(&"config") != Some(Generation::Old);
    println!(
        "   after 3 more promotions: {:?} (demoted: {})",
        cache.generation_of(&"config"),
        demoted
    );
}

fn scan_resistance() {
    println!("2. Scan Resistance");
    println!("   ---------------");

    let mut cache: GenerationalCache<u64, u64> =
        GenerationalCache::new(NonZeroUsize::new(100).unwrap());

    // A hot working set, each key read often enough to be promoted.
    for key in 0..50 {
        cache.put(key, key);
        for _ in 0..cache.promotion_threshold() {
            cache.get(&key);
        }
    }

    // A long scan of keys that are never read again.
    for key in 10_000..20_000 {
        cache.put(key, key);
    }

    let survivors = (0..50).filter(|key| cache.contains_key(key)).count();
    println!("   hot keys surviving a 10000-key scan: {}/50", survivors);
    println!(
        "   young: {}/{}, old: {}/{}",
        cache.young_len(),
        cache.young_capacity(),
        cache.old_len(),
        cache.old_capacity()
    );

    println!("   metrics ({}):", cache.algorithm_name());
    for (name, value) in CacheMetrics::metrics(&cache) {
        println!("     {:<16} {:.3}", name, value);
    }
}

fn weak_values() {
    println!("3. Weak Values");
    println!("   -----------");

    let mut cache: GenerationalCache<String, Weak<Vec<u8>>> =
        GenerationalCache::new(NonZeroUsize::new(16).unwrap());

    let kept = Arc::new(vec![1u8; 32]);
    let dropped = Arc::new(vec![2u8; 32]);
    cache.put("kept".to_string(), Arc::downgrade(&kept));
    cache.put("dropped".to_string(), Arc::downgrade(&dropped));
    drop(dropped);

    println!("   kept:    {:?}", cache.get_live("kept").map(|v| v.len()));
    println!("   dropped: {:?}", cache.get_live("dropped").map(|v| v.len()));
    println!("   entries left: {}, expired: {}", cache.len(), cache.metrics().expired);
}
