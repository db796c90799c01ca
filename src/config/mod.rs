// ABOUTME: Configuration module for pool limits loaded from defaults or the environment
// ABOUTME: Connectors construct their PoolManager from a PoolConfig
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Configuration for connector pools.

/// Pool sizing configuration
pub mod pool;

pub use pool::PoolConfig;
