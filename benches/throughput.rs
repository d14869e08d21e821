//! Throughput Benchmark for anagramd
//!
//! This benchmark measures the TTL cache and the length filter
//! under various workloads.

use anagramd::provider::filter_by_length;
use anagramd::storage::AnagramCache;
use anagramd::CacheConfig;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn candidates(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("anagram{}", i)).collect()
}

fn response_text(n: usize) -> String {
    candidates(n).join("\n")
}

/// Benchmark store operations
fn bench_store(c: &mut Criterion) {
    let cache = Arc::new(AnagramCache::default());
    let value = response_text(16);

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(1));

    group.bench_function("store_new", |b| {
        let mut i = 0u64;
        b.iter(|| {
            cache.store(format!("word:{}", i), value.clone(), Instant::now());
            i += 1;
        });
    });

    group.bench_function("store_overwrite", |b| {
        b.iter(|| {
            cache.store("listen", value.clone(), Instant::now());
        });
    });

    group.finish();
}

/// Benchmark lookup operations
fn bench_lookup(c: &mut Criterion) {
    let cache = Arc::new(AnagramCache::default());
    let value = response_text(16);

    // Pre-populate up to capacity
    for i in 0..10_000 {
        cache.store(format!("word:{}", i), value.clone(), Instant::now());
    }

    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(1));

    group.bench_function("lookup_hit", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(cache.lookup(&format!("word:{}", i % 10_000)));
            i += 1;
        });
    });

    group.bench_function("lookup_miss", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(cache.lookup(&format!("missing:{}", i)));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark eviction once the cache is full
fn bench_eviction(c: &mut Criterion) {
    let cache = Arc::new(AnagramCache::new(CacheConfig {
        ttl: Duration::from_secs(3600),
        max_entries: 1_024,
        shards: 16,
    }));
    let value = response_text(4);

    let mut group = c.benchmark_group("eviction");
    group.throughput(Throughput::Elements(1));

    group.bench_function("store_into_full_cache", |b| {
        let mut i = 0u64;
        b.iter(|| {
            cache.store(format!("word:{}", i), value.clone(), Instant::now());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark concurrent access
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_mixed", |b| {
        b.iter(|| {
            let cache = Arc::new(AnagramCache::default());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        let value = response_text(4);
                        for i in 0..2_000 {
                            let key = format!("word:{}:{}", t, i);
                            cache.store(key.as_str(), value.clone(), Instant::now());
                            cache.lookup(&key);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(cache.len());
        });
    });

    group.finish();
}

/// Benchmark the length filter
fn bench_filter(c: &mut Criterion) {
    let value = candidates(1_000);

    let mut group = c.benchmark_group("filter");
    group.throughput(Throughput::Elements(1_000));

    group.bench_function("filter_by_length", |b| {
        b.iter(|| {
            black_box(filter_by_length(&value, 9));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_store,
    bench_lookup,
    bench_eviction,
    bench_concurrent,
    bench_filter,
);

criterion_main!(benches);
