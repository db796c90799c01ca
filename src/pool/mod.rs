// ABOUTME: Bounded multi-tenant pool of external connection handles
// ABOUTME: Keyed LRU cache with a global capacity ceiling and an idle reaper
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Connector Pool
//!
//! Every connector (Postgres, MSSQL, Snowflake, Neo4j, Kubernetes, Grafana, ...)
//! keeps one expensive handle per tenant: a driver pool, an HTTP session or an
//! SDK client. [`PoolManager`] caches those handles by [`ResourceKey`], charges
//! each one a number of capacity units against a global ceiling, evicts the
//! least recently used entries when the ceiling would be crossed, and closes
//! entries that sit idle past the configured TTL.
//!
//! Connectors only supply a [`ConnectionFactory`].
//!
//! ```rust,no_run
//! use mcp_connector_pool::config::PoolConfig;
//! use mcp_connector_pool::connectors::{HttpSessionConfig, HttpSessionFactory};
//! use mcp_connector_pool::pool::PoolManager;
//! use connector_pool_core::models::ResourceKey;
//! use std::sync::Arc;
//! # async fn example() -> anyhow::Result<()> {
//! let pool = Arc::new(PoolManager::with_config(
//!     HttpSessionFactory::new("grafana"),
//!     PoolConfig::default(),
//! )?);
//! let reaper = pool.spawn_reaper();
//!
//! let key = ResourceKey::new("tenant-a");
//! let config = HttpSessionConfig::new("https://a.grafana.example.com/");
//! let session = pool.acquire(&key, &config).await?;
//! println!("using session for {}", session.base_url());
//!
//! pool.release(&key).await;
//! reaper.shutdown().await;
//! pool.close_all().await;
//! # Ok(())
//! # }
//! ```
//!
//! [`ResourceKey`]: connector_pool_core::models::ResourceKey

/// Pool entry bookkeeping
pub mod entry;
/// Connection factory trait implemented by connectors
pub mod factory;
/// The pool manager itself
pub mod manager;
/// Background idle reaper
pub mod reaper;
/// Counters and diagnostic snapshots
pub mod stats;

pub use entry::PoolEntry;
pub use factory::ConnectionFactory;
pub use manager::PoolManager;
pub use reaper::ReaperHandle;
pub use stats::{EntrySnapshot, PoolStats};
