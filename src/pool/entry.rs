// ABOUTME: Pool entry holding one live handle plus its config snapshot and usage clock
// ABOUTME: Tracks capacity units and a monotonic last-used timestamp for LRU and idle reaping
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use connector_pool_core::models::ResourceKey;
use std::time::Duration;
use tokio::time::Instant;

/// One cached handle
///
/// The entry owns the handle until it is closed; callers only ever receive
/// clones taken while the entry is still in the pool.
#[derive(Debug)]
pub struct PoolEntry<H, C> {
    key: ResourceKey,
    handle: H,
    config: C,
    capacity_units: usize,
    last_used_at: Instant,
    opened_at: DateTime<Utc>,
}

impl<H: Clone, C> PoolEntry<H, C> {
    pub(crate) fn new(key: ResourceKey, handle: H, config: C, capacity_units: usize) -> Self {
        Self {
            key,
            handle,
            config,
            capacity_units,
            last_used_at: Instant::now(),
            opened_at: Utc::now(),
        }
    }

    /// Refresh the usage clock and hand out a clone of the handle
    pub(crate) fn touch(&mut self) -> H {
        let now = Instant::now();
        if now > self.last_used_at {
            self.last_used_at = now;
        }
        self.handle.clone()
    }

    /// Whether the entry has been unused for strictly longer than `idle_ttl`
    pub(crate) fn is_idle(&self, now: Instant, idle_ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_used_at) > idle_ttl
    }

    pub(crate) fn into_parts(self) -> (ResourceKey, H) {
        (self.key, self.handle)
    }

    /// Key this entry is cached under
    #[must_use]
    pub const fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Configuration the handle was opened with
    #[must_use]
    pub const fn config(&self) -> &C {
        &self.config
    }

    /// Capacity units charged against the global ceiling
    #[must_use]
    pub const fn capacity_units(&self) -> usize {
        self.capacity_units
    }

    /// Monotonic time of the last acquisition
    #[must_use]
    pub const fn last_used_at(&self) -> Instant {
        self.last_used_at
    }

    /// Wall-clock time the handle was opened
    #[must_use]
    pub const fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}
