// ABOUTME: Pool sizing and timing defaults shared by every connector
// ABOUTME: Mirrors the limits each connector used before the pool was unified
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Default global capacity ceiling (sum of capacity units across tenants)
pub const DEFAULT_GLOBAL_MAX: usize = 500;

/// Default capacity units per entry (e.g. size of a tenant's DB sub-pool)
pub const DEFAULT_PER_KEY_MAX: usize = 20;

/// Default idle TTL in seconds
pub const DEFAULT_IDLE_TTL_SECS: u64 = 300; // 5 minutes

/// Lower bound for the reaper period so a tiny TTL never yields a zero interval
pub const MIN_REAP_INTERVAL_MS: u64 = 1;
