// ABOUTME: Main library entry point for the multi-tenant connector pool
// ABOUTME: Bounded, LRU-evicting, idle-reaped cache of per-tenant connector handles
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # MCP Connector Pool
//!
//! Multi-tenant MCP servers expose connectors (Postgres, MSSQL, Snowflake,
//! Databricks, Neo4j, Kubernetes, Grafana, ...) as remotely callable tools.
//! Each tenant needs its own expensive handle to the backing system. This
//! crate keeps those handles in one bounded pool per connector:
//!
//! - **Get-or-create** by tenant key, with concurrent callers for the same key
//!   sharing a single open
//! - **Global capacity ceiling** enforced by evicting least recently used
//!   tenants
//! - **Idle reaping** by a cancellable background task
//! - **Explicit release** on tenant teardown
//!
//! Connectors plug in by implementing [`pool::ConnectionFactory`].
//!
//! ## Architecture
//!
//! - **pool**: the `PoolManager`, its entries, stats and reaper
//! - **config**: pool limits from defaults or environment
//! - **connectors**: lifecycle context and the HTTP session factory
//! - **logging**: tracing subscriber setup for the binaries
//! - **testing**: a recording factory for tests and load simulation (`testing`
//!   feature)

/// Pool configuration
pub mod config;

/// Connector lifecycle context and bundled factories
pub mod connectors;

/// Logging configuration and setup
pub mod logging;

/// Connection pool manager
pub mod pool;

/// Recording connection factory for tests and simulations
#[cfg(any(test, feature = "testing"))]
pub mod testing;
