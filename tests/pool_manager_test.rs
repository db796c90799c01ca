// ABOUTME: Integration tests for PoolManager get-or-create, eviction, and release behavior
// ABOUTME: Tests LRU ordering, capacity accounting, failure handling, and config-at-first-creation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use common::{config_for, create_test_pool, tenant};
use connector_pool_core::errors::ConfigError;
use mcp_connector_pool::pool::PoolManager;
use mcp_connector_pool::testing::{MockConfig, MockError, RecordingFactory};
use std::sync::Arc;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(300);

#[tokio::test]
async fn test_evicts_lru_to_admit_third_tenant() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 10, 5, TTL);

    let a = pool.acquire(&tenant("a"), &config_for("a")).await?;
    assert_eq!(pool.capacity_used().await, 5);

    pool.acquire(&tenant("b"), &config_for("b")).await?;
    assert_eq!(pool.capacity_used().await, 10);

    pool.acquire(&tenant("c"), &config_for("c")).await?;

    assert!(!pool.contains(&tenant("a")).await);
    assert!(pool.contains(&tenant("b")).await);
    assert!(pool.contains(&tenant("c")).await);
    assert_eq!(pool.len().await, 2);
    assert_eq!(pool.capacity_used().await, 10);
    assert!(a.is_closed());
    assert_eq!(factory.closed_ids(), vec![a.id()]);

    Ok(())
}

#[tokio::test]
async fn test_eviction_picks_least_recently_touched() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 15, 5, TTL);

    pool.acquire(&tenant("a"), &config_for("a")).await?;
    let b = pool.acquire(&tenant("b"), &config_for("b")).await?;
    pool.acquire(&tenant("c"), &config_for("c")).await?;

    // Touching "a" makes "b" the least recently used
    pool.acquire(&tenant("a"), &config_for("a")).await?;
    pool.acquire(&tenant("d"), &config_for("d")).await?;

    assert_eq!(factory.closed_ids(), vec![b.id()]);
    assert!(!pool.contains(&tenant("b")).await);
    for name in ["a", "c", "d"] {
        assert!(pool.contains(&tenant(name)).await, "{name} should survive");
    }

    Ok(())
}

#[tokio::test]
async fn test_reuse_without_reopen() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 100, 10, TTL);
    let key = tenant("reuse");

    let first = pool.acquire(&key, &config_for("reuse")).await?;
    let second = pool.acquire(&key, &config_for("reuse")).await?;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(factory.open_count(), 1);

    let stats = pool.stats().await;
    assert_eq!(stats.opened, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.capacity_used, 10);

    Ok(())
}

#[tokio::test]
async fn test_config_is_fixed_at_first_creation() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 100, 10, TTL);
    let key = tenant("fixed");

    pool.acquire(&key, &MockConfig::new("first")).await?;
    let handle = pool.acquire(&key, &MockConfig::new("second")).await?;

    assert_eq!(handle.label(), "first");
    assert_eq!(factory.open_count(), 1);

    // A failing config for an already cached key is never sent to the factory
    let cached = pool.acquire(&key, &MockConfig::failing("broken")).await?;
    assert_eq!(cached.label(), "first");

    Ok(())
}

#[tokio::test]
async fn test_release_is_idempotent() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 100, 10, TTL);
    let key = tenant("teardown");

    let handle = pool.acquire(&key, &config_for("teardown")).await?;

    assert!(pool.release(&key).await);
    assert!(handle.is_closed());
    assert_eq!(factory.close_count(), 1);
    assert_eq!(pool.capacity_used().await, 0);

    assert!(!pool.release(&key).await);
    assert_eq!(factory.close_count(), 1);
    assert_eq!(pool.stats().await.released, 1);

    Ok(())
}

#[tokio::test]
async fn test_release_unknown_key_returns_false() {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 100, 10, TTL);

    assert!(!pool.release(&tenant("never-seen")).await);
    assert_eq!(factory.close_count(), 0);
}

#[tokio::test]
async fn test_reacquire_after_release_opens_fresh_handle() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 100, 10, TTL);
    let key = tenant("again");

    let first = pool.acquire(&key, &config_for("again")).await?;
    pool.release(&key).await;
    let second = pool.acquire(&key, &config_for("again")).await?;

    assert_ne!(first.id(), second.id());
    assert!(first.is_closed());
    assert!(!second.is_closed());
    assert_eq!(factory.open_count(), 2);

    Ok(())
}

#[tokio::test]
async fn test_open_failure_consumes_no_capacity() {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 100, 10, TTL);
    let key = tenant("down");

    let err = pool
        .acquire(&key, &MockConfig::failing("down"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        MockError::OpenRefused {
            label: "down".to_owned()
        }
    );
    assert!(!pool.contains(&key).await);
    assert_eq!(pool.capacity_used().await, 0);
    assert_eq!(pool.stats().await.open_failures, 1);
}

#[tokio::test]
async fn test_open_failure_after_eviction_keeps_accounting_consistent() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 10, 5, TTL);

    pool.acquire(&tenant("a"), &config_for("a")).await?;
    pool.acquire(&tenant("b"), &config_for("b")).await?;

    // Admitting "c" evicts "a" before the open fails
    let result = pool.acquire(&tenant("c"), &MockConfig::failing("c")).await;
    assert!(result.is_err());

    assert_eq!(pool.len().await, 1);
    assert_eq!(pool.capacity_used().await, 5);
    assert!(pool.contains(&tenant("b")).await);

    Ok(())
}

#[tokio::test]
async fn test_close_failure_still_removes_entry() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 100, 10, TTL);
    let key = tenant("poisoned");

    pool.acquire(&key, &config_for("poisoned")).await?;
    factory.fail_closes(true);

    assert!(pool.release(&key).await);
    assert!(!pool.contains(&key).await);
    assert_eq!(pool.capacity_used().await, 0);

    let stats = pool.stats().await;
    assert_eq!(stats.close_failures, 1);
    assert_eq!(stats.closed, 0);

    Ok(())
}

#[tokio::test]
async fn test_oversized_entry_admitted_into_empty_pool() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 10, 5, TTL);

    pool.acquire_with_capacity(&tenant("whale"), &config_for("whale"), 30)
        .await?;
    assert_eq!(pool.capacity_used().await, 30);
    assert_eq!(pool.len().await, 1);

    // The next admission evicts it and brings usage back under the ceiling
    pool.acquire(&tenant("small"), &config_for("small")).await?;
    assert!(!pool.contains(&tenant("whale")).await);
    assert_eq!(pool.capacity_used().await, 5);

    Ok(())
}

#[tokio::test]
async fn test_large_entry_evicts_as_many_as_needed() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 20, 5, TTL);

    for name in ["a", "b", "c", "d"] {
        pool.acquire(&tenant(name), &config_for(name)).await?;
    }
    assert_eq!(pool.capacity_used().await, 20);

    pool.acquire_with_capacity(&tenant("big"), &config_for("big"), 12)
        .await?;

    assert_eq!(pool.capacity_used().await, 17);
    assert_eq!(pool.stats().await.evicted, 3);
    assert!(pool.contains(&tenant("d")).await);
    assert!(pool.contains(&tenant("big")).await);

    Ok(())
}

#[tokio::test]
async fn test_max_capacity_charge_saturates_instead_of_overflowing() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 10, 5, TTL);

    let a = pool.acquire(&tenant("a"), &config_for("a")).await?;
    pool.acquire_with_capacity(&tenant("whale"), &config_for("whale"), usize::MAX)
        .await?;

    assert!(a.is_closed());
    assert!(pool.contains(&tenant("whale")).await);
    assert_eq!(pool.capacity_used().await, usize::MAX);

    // The next admission evicts the whale and accounting recovers
    pool.acquire(&tenant("small"), &config_for("small")).await?;
    assert!(!pool.contains(&tenant("whale")).await);
    assert_eq!(pool.capacity_used().await, 5);
    assert_eq!(factory.close_count(), 2);

    Ok(())
}

#[tokio::test]
async fn test_entries_snapshot_is_lru_first() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory, 100, 10, TTL);

    for name in ["a", "b", "c"] {
        pool.acquire(&tenant(name), &config_for(name)).await?;
    }
    pool.acquire(&tenant("a"), &config_for("a")).await?;

    let snapshot = pool.entries_snapshot().await;
    let order: Vec<&str> = snapshot.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(order, vec!["mock:b", "mock:c", "mock:a"]);
    assert!(snapshot.iter().all(|e| e.capacity_units == 10));

    Ok(())
}

#[tokio::test]
async fn test_close_all_drains_pool() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory.clone(), 100, 10, TTL);

    for name in ["a", "b", "c"] {
        pool.acquire(&tenant(name), &config_for(name)).await?;
    }

    assert_eq!(pool.close_all().await, 3);
    assert!(pool.is_empty().await);
    assert_eq!(pool.capacity_used().await, 0);
    assert_eq!(factory.close_count(), 3);
    assert_eq!(pool.close_all().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_stats_serialize_to_json() -> Result<()> {
    let factory = RecordingFactory::new();
    let pool = create_test_pool(factory, 100, 10, TTL);
    pool.acquire(&tenant("a"), &config_for("a")).await?;

    let json = serde_json::to_value(pool.stats().await)?;
    assert_eq!(json["entries"], 1);
    assert_eq!(json["capacity_used"], 10);
    assert_eq!(json["global_max"], 100);

    Ok(())
}

#[test]
fn test_zero_limits_rejected_at_construction() {
    let err = PoolManager::new(RecordingFactory::new(), 0, 5, TTL).unwrap_err();
    assert!(matches!(err, ConfigError::NonPositive { .. }));
    assert_eq!(err.setting(), "global_max");

    let err = PoolManager::new(RecordingFactory::new(), 10, 5, Duration::ZERO).unwrap_err();
    assert_eq!(err.setting(), "idle_ttl");
}
