//! Benchmark suite for the memoizing caches.

use artifact_cache::{
    sync::{ConcurrentCache, InterlockedCache, LockOnWriteCache},
    unsync::Cache,
    GetOrAdd,
};
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion,
    Throughput,
};
use criterion::measurement::WallTime;
use std::{sync::Arc, thread, time::Duration};

const SIZES: [u64; 3] = [100, 1000, 10000];
const NUM_THREADS: u64 = 4;

fn generate(key: &u64) -> Arc<String> {
    Arc::new(format!("artifact-{key}"))
}

fn bench_fill<C>(group: &mut BenchmarkGroup<'_, WallTime>, name: &str, new_cache: impl Fn() -> C)
where
    C: GetOrAdd<u64, Arc<String>>,
{
    for size in SIZES {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
            b.iter(|| {
                let cache = new_cache();
                for i in 0..size {
                    black_box(cache.get_or_add(black_box(i), generate));
                }
            });
        });
    }
}

fn bench_hit<C>(group: &mut BenchmarkGroup<'_, WallTime>, name: &str, new_cache: impl Fn() -> C)
where
    C: GetOrAdd<u64, Arc<String>>,
{
    for size in SIZES {
        let cache = new_cache();
        for i in 0..size {
            cache.get_or_add(i, generate);
        }

        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
            b.iter(|| {
                for i in 0..size {
                    black_box(cache.get_or_add(black_box(i), |_| unreachable!()));
                }
            });
        });
    }
}

// Every thread asks for every key, so most calls race for a missing key.
fn bench_contended_fill<C>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    name: &str,
    new_cache: impl Fn() -> C,
) where
    C: GetOrAdd<u64, Arc<String>> + Sync,
{
    for size in SIZES {
        group.throughput(Throughput::Elements(size * NUM_THREADS));
        group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
            b.iter(|| {
                let cache = new_cache();
                thread::scope(|s| {
                    for _ in 0..NUM_THREADS {
                        s.spawn(|| {
                            for i in 0..size {
                                black_box(cache.get_or_add(black_box(i), generate));
                            }
                        });
                    }
                });
            });
        });
    }
}

/// Benchmark filling an empty cache. Every call constructs a value.
fn fill_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");
    bench_fill(&mut group, "unsync", Cache::new);
    bench_fill(&mut group, "concurrent", ConcurrentCache::new);
    bench_fill(&mut group, "interlocked", InterlockedCache::new);
    bench_fill(&mut group, "lock_on_write", LockOnWriteCache::new);
    group.finish();
}

/// Benchmark lookups on a fully populated cache. No call constructs a value.
fn hit_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit");
    bench_hit(&mut group, "unsync", Cache::new);
    bench_hit(&mut group, "concurrent", ConcurrentCache::new);
    bench_hit(&mut group, "interlocked", InterlockedCache::new);
    bench_hit(&mut group, "lock_on_write", LockOnWriteCache::new);
    group.finish();
}

/// Benchmark filling an empty cache from several threads at once.
///
/// Compares redundant construction in `ConcurrentCache` with serialized
/// construction in the pessimistic caches.
fn contended_fill_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_fill");
    bench_contended_fill(&mut group, "concurrent", ConcurrentCache::new);
    bench_contended_fill(&mut group, "interlocked", InterlockedCache::new);
    bench_contended_fill(&mut group, "lock_on_write", LockOnWriteCache::new);
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(100);
    targets = fill_benchmark, hit_benchmark, contended_fill_benchmark
}

criterion_main!(benches);
