// ABOUTME: Pool sizing configuration with defaults, validation, and environment loading
// ABOUTME: Global ceiling, per-entry capacity units, and idle TTL shared by every connector
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use connector_pool_core::constants::{env_config, pool};
use connector_pool_core::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Limits for one connector's pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Ceiling on the sum of capacity units across all tenants
    pub global_max: usize,
    /// Capacity units charged per entry unless the caller says otherwise
    pub per_key_max: usize,
    /// How long an entry may sit unused before the reaper closes it
    #[serde(with = "duration_secs")]
    pub idle_ttl: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            global_max: pool::DEFAULT_GLOBAL_MAX,
            per_key_max: pool::DEFAULT_PER_KEY_MAX,
            idle_ttl: Duration::from_secs(pool::DEFAULT_IDLE_TTL_SECS),
        }
    }
}

impl PoolConfig {
    /// Load pool configuration from environment
    ///
    /// Missing or unparseable variables fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            global_max: env::var(env_config::POOL_GLOBAL_MAX)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(pool::DEFAULT_GLOBAL_MAX),
            per_key_max: env::var(env_config::POOL_PER_KEY_MAX)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(pool::DEFAULT_PER_KEY_MAX),
            idle_ttl: env::var(env_config::POOL_IDLE_TTL_SECS)
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or_else(
                    || Duration::from_secs(pool::DEFAULT_IDLE_TTL_SECS),
                    Duration::from_secs,
                ),
        }
    }

    /// Check that every limit is positive
    ///
    /// # Errors
    ///
    /// Returns an error naming the first zero limit
    pub fn validate(&self) -> ConfigResult<()> {
        if self.global_max == 0 {
            return Err(ConfigError::non_positive("global_max"));
        }
        if self.per_key_max == 0 {
            return Err(ConfigError::non_positive("per_key_max"));
        }
        if self.idle_ttl.is_zero() {
            return Err(ConfigError::non_positive("idle_ttl"));
        }
        Ok(())
    }

    /// Period of the background reaper: half the idle TTL
    #[must_use]
    pub fn reap_interval(&self) -> Duration {
        (self.idle_ttl / 2).max(Duration::from_millis(pool::MIN_REAP_INTERVAL_MS))
    }
}

/// Serialize durations as whole seconds, matching the environment variables
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
