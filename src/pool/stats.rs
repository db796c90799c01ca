// ABOUTME: Pool counters and serializable diagnostics snapshots
// ABOUTME: Lock-free counters updated on every pool operation, read by stats()
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use connector_pool_core::models::ResourceKey;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Point-in-time view of a pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Cached entries
    pub entries: usize,
    /// Capacity units in use, including reservations for in-flight opens
    pub capacity_used: usize,
    /// Configured global ceiling
    pub global_max: usize,
    /// Acquisitions served from cache
    pub hits: u64,
    /// Handles opened by the factory
    pub opened: u64,
    /// Factory `open` calls that failed
    pub open_failures: u64,
    /// Handles closed cleanly
    pub closed: u64,
    /// Factory `close` calls that failed (entry dropped anyway)
    pub close_failures: u64,
    /// Entries evicted to make room
    pub evicted: u64,
    /// Entries closed by the idle reaper
    pub reaped: u64,
    /// Entries removed by explicit release
    pub released: u64,
}

/// Diagnostics for one cached entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    /// Pool key
    pub key: ResourceKey,
    /// Capacity units charged
    pub capacity_units: usize,
    /// Time since the last acquisition
    pub idle_for: Duration,
    /// When the handle was opened
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    hits: AtomicU64,
    opened: AtomicU64,
    open_failures: AtomicU64,
    closed: AtomicU64,
    close_failures: AtomicU64,
    evicted: AtomicU64,
    reaped: AtomicU64,
    released: AtomicU64,
}

impl PoolCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_open(&self) {
        self.opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_open_failure(&self) {
        self.open_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_close(&self) {
        self.closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_close_failure(&self) {
        self.close_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evicted(&self, count: usize) {
        self.evicted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_reaped(&self, count: usize) {
        self.reaped.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_released(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    /// Fill the counter fields of a stats snapshot
    pub(crate) fn snapshot(&self, entries: usize, capacity_used: usize, global_max: usize) -> PoolStats {
        PoolStats {
            entries,
            capacity_used,
            global_max,
            hits: self.hits.load(Ordering::Relaxed),
            opened: self.opened.load(Ordering::Relaxed),
            open_failures: self.open_failures.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
            close_failures: self.close_failures.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            reaped: self.reaped.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }
}
