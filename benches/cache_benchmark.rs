//! Performance benchmarks for the response cache.
//!
//! This benchmark suite measures:
//! - InMemory store operations (set, get, scan)
//! - ResponseCache hits and misses
//! - MovieService lookups with a warm cache
//!
//! Run with: cargo bench
//! View results: open target/criterion/report/index.html

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mrate_client::omdb::memory::{movie_stub, InMemorySource};
use mrate_client::store::{InMemoryStore, KeyValueStore};
use mrate_client::{FetchStrategy, MovieService, ResponseCache};
use std::hint::black_box;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

fn bench_store(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("store");

    for size in [256usize, 4 * 1024, 64 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        let store = InMemoryStore::new();
        let value = "x".repeat(size);

        group.bench_with_input(BenchmarkId::new("set", size), &value, |b, value| {
            b.to_async(&rt)
                .iter(|| async { store.set("omdb_cache_bench", value.clone()).await })
        });

        group.bench_with_input(BenchmarkId::new("get", size), &size, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(store.get("omdb_cache_bench").await) })
        });
    }

    let store = InMemoryStore::new();
    rt.block_on(async {
        for i in 0..1_000 {
            let key = if i % 2 == 0 {
                format!("omdb_cache_movie_tt{:07}", i)
            } else {
                format!("other_{}", i)
            };
            store
                .set(&key, "{}".to_string())
                .await
                .expect("Failed to seed store");
        }
    });
    group.bench_function("scan_1000", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(store.scan("omdb_cache_").await) })
    });

    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("response_cache");

    let cache = ResponseCache::new(InMemoryStore::new());
    let movie = movie_stub("tt1375666", "Inception", "2010");
    rt.block_on(cache.set("movie_tt1375666", &movie));

    group.bench_function("hit", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(
                cache
                    .get::<mrate_client::omdb::Movie>("movie_tt1375666")
                    .await,
            )
        })
    });

    group.bench_function("miss", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(cache.get::<mrate_client::omdb::Movie>("movie_absent").await)
        })
    });

    group.bench_function("set", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(cache.set("movie_tt1375666", &movie).await) })
    });

    group.finish();
}

fn bench_service(c: &mut Criterion) {
    let rt = runtime();
    let mut source = InMemorySource::new();
    for i in 0..100 {
        source.insert_movie(movie_stub(&format!("tt{:07}", i), "Bench", "2000"));
    }
    let movies = MovieService::new(InMemoryStore::new(), source);
    let ids: Vec<String> = (0..100).map(|i| format!("tt{:07}", i)).collect();
    rt.block_on(movies.fetch_movies(&ids));

    c.bench_function("service_warm_lookup", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(
                movies
                    .fetch_movie_by_id("tt0000042", FetchStrategy::Refresh)
                    .await,
            )
        })
    });

    c.bench_function("service_warm_batch_100", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(movies.fetch_movies(&ids).await) })
    });
}

criterion_group!(benches, bench_store, bench_cache, bench_service);
criterion_main!(benches);
