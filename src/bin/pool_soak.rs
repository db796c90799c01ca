// ABOUTME: Soak harness that drives a connector pool with many concurrent simulated tenants
// ABOUTME: Reports pool stats as JSON and fails if capacity accounting drifts or handles leak
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Connector pool soak harness.
//!
//! Spawns worker tasks that acquire random tenant keys from one pool backed by
//! the recording factory, with simulated open latency, occasional open
//! failures and tenant teardowns, while the background reaper runs.
//!
//! Usage:
//! ```bash
//! # Defaults: 200 tenants, 32 workers, 500/20/2s pool
//! cargo run --features testing --bin pool-soak
//!
//! # Tight ceiling to force constant eviction
//! cargo run --features testing --bin pool-soak -- --global-max 100 --per-key-max 20 --tenants 50
//!
//! # JSON logs
//! LOG_FORMAT=json cargo run --features testing --bin pool-soak -- -v
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use connector_pool_core::constants::pool;
use connector_pool_core::models::ResourceKey;
use mcp_connector_pool::config::PoolConfig;
use mcp_connector_pool::logging::LoggingConfig;
use mcp_connector_pool::pool::PoolManager;
use mcp_connector_pool::testing::{MockConfig, RecordingFactory};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "pool-soak",
    about = "Connector pool soak harness",
    long_about = "Drive one connector pool with concurrent simulated tenants and report its stats"
)]
struct SoakArgs {
    /// Distinct tenant keys
    #[arg(long, default_value_t = 200)]
    tenants: usize,

    /// Concurrent worker tasks
    #[arg(long, default_value_t = 32)]
    workers: usize,

    /// Acquisitions per worker
    #[arg(long, default_value_t = 500)]
    iterations: usize,

    /// Global capacity ceiling
    #[arg(long, default_value_t = pool::DEFAULT_GLOBAL_MAX)]
    global_max: usize,

    /// Capacity units per tenant
    #[arg(long, default_value_t = pool::DEFAULT_PER_KEY_MAX)]
    per_key_max: usize,

    /// Idle TTL in milliseconds
    #[arg(long, default_value_t = 2_000)]
    idle_ttl_ms: u64,

    /// Simulated open latency in milliseconds
    #[arg(long, default_value_t = 5)]
    open_delay_ms: u64,

    /// Percentage of opens that fail
    #[arg(long, default_value_t = 2)]
    failure_percent: u8,

    /// Percentage of iterations that tear a tenant down instead of acquiring
    #[arg(long, default_value_t = 3)]
    release_percent: u8,

    /// RNG seed for reproducible runs
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SoakArgs::parse();

    let mut logging = LoggingConfig::from_env();
    if args.verbose {
        logging.level = "debug".into();
    }
    logging.init()?;

    let config = PoolConfig {
        global_max: args.global_max,
        per_key_max: args.per_key_max,
        idle_ttl: Duration::from_millis(args.idle_ttl_ms),
    };
    let factory = RecordingFactory::new().with_open_delay(Duration::from_millis(args.open_delay_ms));
    let pool = Arc::new(PoolManager::with_config(factory.clone(), config)?);
    let reaper = pool.spawn_reaper();

    let run_id = Uuid::new_v4();
    info!(
        run_id = %run_id,
        tenants = args.tenants,
        workers = args.workers,
        iterations = args.iterations,
        "Starting soak run"
    );

    let peak_capacity = Arc::new(AtomicUsize::new(0));
    let mut workers = Vec::with_capacity(args.workers);
    for worker in 0..args.workers {
        let pool = Arc::clone(&pool);
        let peak_capacity = Arc::clone(&peak_capacity);
        let tenants = args.tenants.max(1);
        let iterations = args.iterations;
        let failure_percent = args.failure_percent;
        let release_percent = args.release_percent;
        let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(worker as u64));

        workers.push(tokio::spawn(async move {
            for _ in 0..iterations {
                let tenant = rng.gen_range(0..tenants);
                let key = ResourceKey::scoped("soak", tenant);
                if rng.gen_range(0..100) < release_percent {
                    pool.release(&key).await;
                    continue;
                }
                let config = if rng.gen_range(0..100) < failure_percent {
                    MockConfig::failing(key.as_str())
                } else {
                    MockConfig::new(key.as_str())
                };
                // Open failures are part of the simulated workload
                let _ = pool.acquire(&key, &config).await;
                peak_capacity.fetch_max(pool.capacity_used().await, Ordering::Relaxed);
            }
        }));
    }

    for worker in workers {
        worker.await?;
    }

    reaper.shutdown().await;
    let stats = pool.stats().await;
    let closed_on_shutdown = pool.close_all().await;

    let report = serde_json::json!({
        "run_id": run_id,
        "stats": stats,
        "closed_on_shutdown": closed_on_shutdown,
        "peak_capacity": peak_capacity.load(Ordering::Relaxed),
        "max_concurrent_opens": factory.max_concurrent_opens(),
        "factory_opens": factory.open_count(),
        "factory_closes": factory.close_count(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    // Every soak entry is charged per_key_max, so usage must match occupancy exactly
    if stats.capacity_used != stats.entries * args.per_key_max {
        bail!(
            "capacity accounting drifted: {} units for {} entries",
            stats.capacity_used,
            stats.entries
        );
    }
    if factory.open_count() - stats.open_failures != factory.close_count() {
        bail!(
            "leaked handles: {} opened, {} closed",
            factory.open_count() - stats.open_failures,
            factory.close_count()
        );
    }

    Ok(())
}
