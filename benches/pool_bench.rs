// ABOUTME: Criterion benchmarks for connector pool acquire, release, and reap paths
// ABOUTME: Measures cache-hit latency, evicting misses at the ceiling, and reap sweeps
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Criterion benchmarks for the connector pool.
//!
//! All benchmarks use the recording factory with zero open latency, so the
//! numbers reflect pool bookkeeping rather than connector I/O.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use connector_pool_core::models::ResourceKey;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mcp_connector_pool::config::PoolConfig;
use mcp_connector_pool::pool::PoolManager;
use mcp_connector_pool::testing::{MockConfig, RecordingFactory};
use std::time::Duration;
use tokio::runtime::Runtime;

const PER_KEY_UNITS: usize = 10;

fn bench_pool(tenants: usize) -> PoolManager<RecordingFactory> {
    PoolManager::with_config(
        RecordingFactory::new(),
        PoolConfig {
            global_max: tenants * PER_KEY_UNITS,
            per_key_max: PER_KEY_UNITS,
            idle_ttl: Duration::from_secs(3600),
        },
    )
    .unwrap()
}

fn tenant_key(index: usize) -> ResourceKey {
    ResourceKey::scoped("bench", index)
}

/// Benchmark acquisitions served from cache at different pool sizes
fn bench_acquire_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("acquire_hit");
    let config = MockConfig::new("bench");

    for tenants in [10_usize, 100, 1_000] {
        let pool = bench_pool(tenants);
        rt.block_on(async {
            for i in 0..tenants {
                pool.acquire(&tenant_key(i), &config).await.unwrap();
            }
        });
        let keys: Vec<ResourceKey> = (0..tenants).map(tenant_key).collect();

        group.bench_with_input(BenchmarkId::from_parameter(tenants), &keys, |b, keys| {
            let mut index = 0_usize;
            b.iter(|| {
                let key = &keys[index % keys.len()];
                index = index.wrapping_add(1);
                rt.block_on(async { pool.acquire(black_box(key), &config).await.unwrap() })
            });
        });
    }

    group.finish();
}

/// Benchmark misses on a full pool, each one evicting the LRU tenant
fn bench_acquire_evicting_miss(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("acquire_evicting_miss");
    let config = MockConfig::new("bench");

    for tenants in [10_usize, 100, 1_000] {
        let pool = bench_pool(tenants);
        rt.block_on(async {
            for i in 0..tenants {
                pool.acquire(&tenant_key(i), &config).await.unwrap();
            }
        });

        group.bench_function(BenchmarkId::from_parameter(tenants), |b| {
            let mut index = tenants;
            b.iter(|| {
                let key = tenant_key(index);
                index = index.wrapping_add(1);
                rt.block_on(async { pool.acquire(black_box(&key), &config).await.unwrap() })
            });
        });
    }

    group.finish();
}

/// Benchmark acquire followed by explicit release of a fresh tenant
fn bench_acquire_release(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let pool = bench_pool(100);
    let config = MockConfig::new("bench");
    let key = tenant_key(0);

    c.bench_function("acquire_release", |b| {
        b.iter(|| {
            rt.block_on(async {
                pool.acquire(black_box(&key), &config).await.unwrap();
                pool.release(black_box(&key)).await
            })
        });
    });
}

/// Benchmark a reap sweep that finds nothing idle
fn bench_reap_no_idle(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("reap_no_idle");
    let config = MockConfig::new("bench");

    for tenants in [100_usize, 1_000] {
        let pool = bench_pool(tenants);
        rt.block_on(async {
            for i in 0..tenants {
                pool.acquire(&tenant_key(i), &config).await.unwrap();
            }
        });

        group.bench_function(BenchmarkId::from_parameter(tenants), |b| {
            b.iter(|| rt.block_on(async { black_box(pool.reap().await) }));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_acquire_hit,
    bench_acquire_evicting_miss,
    bench_acquire_release,
    bench_reap_no_idle
);
criterion_main!(benches);
