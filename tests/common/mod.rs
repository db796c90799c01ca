// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging plus pool and key builders over the recording factory
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `mcp_connector_pool`

use connector_pool_core::models::ResourceKey;
use mcp_connector_pool::config::PoolConfig;
use mcp_connector_pool::pool::PoolManager;
use mcp_connector_pool::testing::{MockConfig, RecordingFactory};
use std::env;
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; default to WARN for quiet tests
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            Ok("WARN" | "ERROR") | _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Pool over `factory` with the given limits
pub fn create_test_pool(
    factory: RecordingFactory,
    global_max: usize,
    per_key_max: usize,
    idle_ttl: Duration,
) -> Arc<PoolManager<RecordingFactory>> {
    init_test_logging();
    let config = PoolConfig {
        global_max,
        per_key_max,
        idle_ttl,
    };
    Arc::new(PoolManager::with_config(factory, config).unwrap())
}

/// Tenant key in the `mock` connector namespace
pub fn tenant(name: &str) -> ResourceKey {
    ResourceKey::scoped("mock", name)
}

/// Config labelled after the tenant
pub fn config_for(name: &str) -> MockConfig {
    MockConfig::new(name)
}
