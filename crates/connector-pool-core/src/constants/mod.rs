// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pool sizing defaults, environment variable names, and service identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Constants grouped by domain.

/// Pool sizing and timing defaults
pub mod pool;

/// Environment variable names read by configuration loaders
pub mod env_config {
    /// Global capacity ceiling across all tenants
    pub const POOL_GLOBAL_MAX: &str = "CONNECTOR_POOL_GLOBAL_MAX";
    /// Capacity units charged per pool entry
    pub const POOL_PER_KEY_MAX: &str = "CONNECTOR_POOL_PER_KEY_MAX";
    /// Idle TTL in seconds before the reaper closes an entry
    pub const POOL_IDLE_TTL_SECS: &str = "CONNECTOR_POOL_IDLE_TTL_SECS";
}

/// Service identifiers used in structured logs
pub mod service_names {
    /// Default service name
    pub const CONNECTOR_POOL: &str = "mcp-connector-pool";
}
