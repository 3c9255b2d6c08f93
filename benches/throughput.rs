//! Throughput Benchmark for zcache
//!
//! Measures the storage engine and the cache commands built on it under
//! various workloads.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;
use zcache::storage::StorageEngine;
use zcache::Cache;

/// Benchmark SET operations on the engine
fn bench_set(c: &mut Criterion) {
    let engine = Arc::new(StorageEngine::new());

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            engine.set(key, Bytes::from("small_value"));
            i += 1;
        });
    });

    group.bench_function("set_with_ttl", |b| {
        let mut i = 0u64;
        let value = Bytes::from("x".repeat(1024)); // 1KB value
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            engine.set_with_ttl(key, value.clone(), Duration::from_secs(3600));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations on the engine
fn bench_get(c: &mut Criterion) {
    let engine = Arc::new(StorageEngine::new());

    for i in 0..100_000 {
        let key = Bytes::from(format!("key:{}", i));
        let value = Bytes::from(format!("value:{}", i));
        engine.set(key, value);
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 100_000);
            black_box(engine.get(key.as_bytes()));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(engine.get(key.as_bytes()));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark INCR through the cache
fn bench_incr(c: &mut Criterion) {
    let cache = Cache::new();

    let mut group = c.benchmark_group("incr");
    group.throughput(Throughput::Elements(1));

    // Single counter
    group.bench_function("single_counter", |b| {
        b.iter(|| {
            black_box(cache.incr("counter"));
        });
    });

    group.bench_function("multiple_counters", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("counter:{}", i % 1000);
            black_box(cache.incr(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark ZADD against collections of growing size
fn bench_zadd(c: &mut Criterion) {
    let mut group = c.benchmark_group("zadd");
    group.throughput(Throughput::Elements(1));

    for size in [10usize, 100, 1_000] {
        let cache = Cache::new();
        let tokens: Vec<String> = (0..size).map(|i| format!("{} member:{}", i, i)).collect();
        cache.zadd("board", &tokens);

        group.bench_with_input(BenchmarkId::new("new_member", size), &size, |b, _| {
            let mut i = 0u64;
            b.iter(|| {
                let token = format!("{} fresh:{}", i % 100, i);
                black_box(cache.zadd("scratch", [token]));
                i += 1;
            });
        });

        group.bench_with_input(BenchmarkId::new("existing_member", size), &size, |b, _| {
            let mut i = 0usize;
            b.iter(|| {
                let token = format!("1 member:{}", i % size);
                black_box(cache.zadd("board", [token]));
                i += 1;
            });
        });
    }

    group.finish();
}

/// Benchmark ZRANGE and ZRANK reads
fn bench_zrange(c: &mut Criterion) {
    let cache = Cache::new();
    let tokens: Vec<String> = (0..1_000).map(|i| format!("{} member:{}", i, i)).collect();
    cache.zadd("board", &tokens);

    let mut group = c.benchmark_group("zrange");

    group.bench_function("top_10", |b| {
        b.iter(|| {
            black_box(cache.zrange("board", -10, -1));
        });
    });

    group.bench_function("full", |b| {
        b.iter(|| {
            black_box(cache.zrange("board", 0, -1));
        });
    });

    group.bench_function("zrank", |b| {
        b.iter(|| {
            black_box(cache.zrank("board", "member:500"));
        });
    });

    group.finish();
}

/// Benchmark concurrent ZADD against a single key
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_zadd", |b| {
        b.iter(|| {
            let cache = Arc::new(Cache::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        for i in 0..250 {
                            cache.zadd("board", [format!("{} m:{}:{}", i, t, i)]);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(cache.zcard("board"));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_incr,
    bench_zadd,
    bench_zrange,
    bench_concurrent,
);

criterion_main!(benches);
