// ABOUTME: PoolManager caching one connector handle per tenant key under a global capacity ceiling
// ABOUTME: Get-or-create with LRU eviction, explicit release, and idle reaping without holding locks over I/O
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::entry::PoolEntry;
use super::factory::ConnectionFactory;
use super::stats::{EntrySnapshot, PoolCounters, PoolStats};
use crate::config::PoolConfig;
use connector_pool_core::errors::ConfigResult;
use connector_pool_core::models::ResourceKey;
use futures_util::future::join_all;
use lru::LruCache;
use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Per-key lock serializing the creation of one key's entry
type OpeningSlot = Arc<Mutex<()>>;

/// In-flight open for one key
#[derive(Default)]
struct Opening {
    slot: OpeningSlot,
    /// Capacity held back for the handle being opened
    reserved_units: usize,
}

/// Why an entry left the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    Evicted,
    Idle,
    Released,
    Shutdown,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Evicted => "evicted",
            Self::Idle => "idle",
            Self::Released => "released",
            Self::Shutdown => "shutdown",
        };
        f.write_str(reason)
    }
}

/// Everything guarded by the structural lock
struct PoolState<H, C> {
    /// Iteration order is MRU first; `pop_lru` yields the eviction victim
    entries: LruCache<ResourceKey, PoolEntry<H, C>>,
    /// Units of cached entries plus reservations of in-flight opens
    capacity_used: usize,
    opening: HashMap<ResourceKey, Opening>,
}

impl<H: Clone, C> PoolState<H, C> {
    fn new() -> Self {
        Self {
            entries: LruCache::unbounded(),
            capacity_used: 0,
            opening: HashMap::new(),
        }
    }

    /// Cache hit: refresh the entry, promote it to MRU and clone its handle
    fn touch(&mut self, key: &ResourceKey) -> Option<H> {
        self.entries.get_mut(key).map(PoolEntry::touch)
    }

    fn remove(&mut self, key: &ResourceKey) -> Option<PoolEntry<H, C>> {
        let entry = self.entries.pop(key)?;
        self.capacity_used = self.capacity_used.saturating_sub(entry.capacity_units());
        Some(entry)
    }

    /// Slot to wait on before trying to create `key`
    fn opening_slot(&mut self, key: &ResourceKey) -> OpeningSlot {
        Arc::clone(&self.opening.entry(key.clone()).or_default().slot)
    }

    /// Make the caller holding `slot` the opener of `key`
    ///
    /// Returns `false` when a different slot now owns the key; the caller must
    /// wait on that one instead.
    fn claim_opening(&mut self, key: &ResourceKey, slot: &OpeningSlot) -> bool {
        let Self {
            opening,
            capacity_used,
            ..
        } = self;
        match opening.get_mut(key) {
            Some(current) if Arc::ptr_eq(&current.slot, slot) => {
                // A previous opener was cancelled mid-open; drop its reservation
                let stale = mem::take(&mut current.reserved_units);
                *capacity_used = capacity_used.saturating_sub(stale);
                true
            }
            Some(_) => false,
            None => {
                opening.insert(
                    key.clone(),
                    Opening {
                        slot: Arc::clone(slot),
                        reserved_units: 0,
                    },
                );
                true
            }
        }
    }

    /// Evict LRU entries until `units` more fit under `global_max`, then reserve them
    fn reserve(
        &mut self,
        key: &ResourceKey,
        units: usize,
        global_max: usize,
    ) -> Vec<PoolEntry<H, C>> {
        let mut evicted = Vec::new();
        while self.capacity_used.saturating_add(units) > global_max {
            let Some((_, entry)) = self.entries.pop_lru() else {
                break;
            };
            self.capacity_used = self.capacity_used.saturating_sub(entry.capacity_units());
            evicted.push(entry);
        }
        self.capacity_used = self.capacity_used.saturating_add(units);
        if let Some(opening) = self.opening.get_mut(key) {
            opening.reserved_units = units;
        }
        evicted
    }

    /// Drop `slot`'s opening record and give back its reservation
    fn finish_opening(&mut self, key: &ResourceKey, slot: &OpeningSlot) {
        if self
            .opening
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(&current.slot, slot))
        {
            if let Some(opening) = self.opening.remove(key) {
                self.capacity_used = self.capacity_used.saturating_sub(opening.reserved_units);
            }
        }
    }

    /// Forget openings whose opener went away without finishing
    ///
    /// A live opener holds its slot for the whole open, so an unlocked slot is
    /// either abandoned or about to be re-claimed through `claim_opening`.
    fn purge_abandoned_openings(&mut self) {
        let Self {
            opening,
            capacity_used,
            ..
        } = self;
        opening.retain(|_, pending| {
            if pending.slot.try_lock().is_ok() {
                *capacity_used = capacity_used.saturating_sub(pending.reserved_units);
                false
            } else {
                true
            }
        });
    }

    fn drain(&mut self) -> Vec<PoolEntry<H, C>> {
        let mut drained = Vec::with_capacity(self.entries.len());
        while let Some((_, entry)) = self.entries.pop_lru() {
            self.capacity_used = self.capacity_used.saturating_sub(entry.capacity_units());
            drained.push(entry);
        }
        drained
    }
}

/// Bounded, keyed cache of connector handles
///
/// One instance per connector, owned by the connector's lifecycle context and
/// shared by reference (usually `Arc<PoolManager<F>>`). All bookkeeping sits
/// behind a single async mutex which is never held while the factory opens or
/// closes a handle, so a slow tenant never stalls the others.
///
/// Closes run on tasks tracked by the pool: a caller dropped mid-close (for
/// example by a timeout around a tool call) never leaks the handle, and
/// [`close_all`](Self::close_all) waits for every close still in flight.
pub struct PoolManager<F: ConnectionFactory> {
    factory: Arc<F>,
    config: PoolConfig,
    state: Mutex<PoolState<F::Handle, F::Config>>,
    counters: Arc<PoolCounters>,
    closes: TaskTracker,
}

impl<F: ConnectionFactory> fmt::Debug for PoolManager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolManager")
            .field("connector", &self.factory.kind())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<F: ConnectionFactory> PoolManager<F> {
    /// Create a pool from explicit limits
    ///
    /// # Errors
    ///
    /// Returns an error if any limit is zero
    pub fn new(
        factory: F,
        global_max: usize,
        per_key_max: usize,
        idle_ttl: Duration,
    ) -> ConfigResult<Self> {
        Self::with_config(
            factory,
            PoolConfig {
                global_max,
                per_key_max,
                idle_ttl,
            },
        )
    }

    /// Create a pool from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn with_config(factory: F, config: PoolConfig) -> ConfigResult<Self> {
        config.validate()?;
        info!(
            connector = factory.kind(),
            global_max = config.global_max,
            per_key_max = config.per_key_max,
            idle_ttl_secs = config.idle_ttl.as_secs(),
            "Initializing connector pool"
        );
        Ok(Self {
            factory: Arc::new(factory),
            config,
            state: Mutex::new(PoolState::new()),
            counters: Arc::default(),
            closes: TaskTracker::new(),
        })
    }

    /// Limits this pool was built with
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The connector's factory
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Get the cached handle for `key`, opening one with `config` on a miss
    ///
    /// The entry is charged `per_key_max` capacity units. A cached handle is
    /// reused as-is even when `config` differs from the one it was opened with.
    ///
    /// # Errors
    ///
    /// Returns the factory's error unchanged if opening fails
    pub async fn acquire(
        &self,
        key: &ResourceKey,
        config: &F::Config,
    ) -> Result<F::Handle, F::Error> {
        self.acquire_with_capacity(key, config, self.config.per_key_max)
            .await
    }

    /// Like [`acquire`](Self::acquire) with an explicit capacity charge
    ///
    /// # Errors
    ///
    /// Returns the factory's error unchanged if opening fails
    pub async fn acquire_with_capacity(
        &self,
        key: &ResourceKey,
        config: &F::Config,
        capacity_units: usize,
    ) -> Result<F::Handle, F::Error> {
        loop {
            let slot = {
                let mut state = self.state.lock().await;
                if let Some(handle) = state.touch(key) {
                    drop(state);
                    self.record_hit(key);
                    return Ok(handle);
                }
                state.opening_slot(key)
            };

            // Same-key callers queue here while the first one opens
            let _opening = slot.lock().await;

            let evicted = {
                let mut state = self.state.lock().await;
                if let Some(handle) = state.touch(key) {
                    state.finish_opening(key, &slot);
                    drop(state);
                    self.record_hit(key);
                    return Ok(handle);
                }
                if !state.claim_opening(key, &slot) {
                    continue;
                }
                let evicted = state.reserve(key, capacity_units, self.config.global_max);
                if state.capacity_used > self.config.global_max {
                    warn!(
                        connector = self.factory.kind(),
                        key = %key,
                        capacity_used = state.capacity_used,
                        global_max = self.config.global_max,
                        "Admitting connection over capacity: nothing left to evict"
                    );
                }
                evicted
            };

            if !evicted.is_empty() {
                self.counters.record_evicted(evicted.len());
                info!(
                    connector = self.factory.kind(),
                    key = %key,
                    evicted = evicted.len(),
                    "Evicted least recently used connections to admit new tenant"
                );
                self.close_entries(evicted, CloseReason::Evicted).await;
            }

            return self.open_reserved(key, config, capacity_units, &slot).await;
        }
    }

    /// Open the handle for a key whose capacity is already reserved
    async fn open_reserved(
        &self,
        key: &ResourceKey,
        config: &F::Config,
        capacity_units: usize,
        slot: &OpeningSlot,
    ) -> Result<F::Handle, F::Error> {
        debug!(
            connector = self.factory.kind(),
            key = %key,
            capacity_units,
            "Opening connection"
        );
        let opened = self.factory.open(config).await;

        let mut state = self.state.lock().await;
        state.finish_opening(key, slot);
        match opened {
            Ok(handle) => {
                state.entries.push(
                    key.clone(),
                    PoolEntry::new(key.clone(), handle.clone(), config.clone(), capacity_units),
                );
                state.capacity_used = state.capacity_used.saturating_add(capacity_units);
                drop(state);
                self.counters.record_open();
                Ok(handle)
            }
            Err(error) => {
                drop(state);
                self.counters.record_open_failure();
                warn!(
                    connector = self.factory.kind(),
                    key = %key,
                    error = %error,
                    "Failed to open connection"
                );
                Err(error)
            }
        }
    }

    /// Close and forget the entry for `key`
    ///
    /// Returns `false` if nothing was cached. An open still in flight for `key`
    /// is waited for and then released.
    pub async fn release(&self, key: &ResourceKey) -> bool {
        let pending = {
            let mut state = self.state.lock().await;
            if let Some(entry) = state.remove(key) {
                drop(state);
                self.finish_release(entry).await;
                return true;
            }
            state
                .opening
                .get(key)
                .map(|opening| Arc::clone(&opening.slot))
        };

        let Some(slot) = pending else {
            return false;
        };
        let _settled = slot.lock().await;
        let removed = self.state.lock().await.remove(key);
        match removed {
            Some(entry) => {
                self.finish_release(entry).await;
                true
            }
            None => false,
        }
    }

    async fn finish_release(&self, entry: PoolEntry<F::Handle, F::Config>) {
        self.counters.record_released();
        self.close_entries(vec![entry], CloseReason::Released).await;
    }

    /// Close every entry unused for longer than the idle TTL
    ///
    /// Returns how many entries were reaped.
    pub async fn reap(&self) -> usize {
        let idle_ttl = self.config.idle_ttl;
        let expired = {
            let mut state = self.state.lock().await;
            state.purge_abandoned_openings();
            let now = Instant::now();
            let idle_keys: Vec<ResourceKey> = state
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_idle(now, idle_ttl))
                .map(|(key, _)| key.clone())
                .collect();
            idle_keys
                .iter()
                .filter_map(|key| state.remove(key))
                .collect::<Vec<_>>()
        };

        let reaped = expired.len();
        if reaped > 0 {
            self.counters.record_reaped(reaped);
            info!(
                connector = self.factory.kind(),
                reaped,
                "Reaped idle connections"
            );
            self.close_entries(expired, CloseReason::Idle).await;
        }
        reaped
    }

    /// Close every cached entry, e.g. on process shutdown
    ///
    /// Also waits for closes started by evictions, releases and reaps whose
    /// callers went away. Returns how many cached entries were closed.
    pub async fn close_all(&self) -> usize {
        let drained = self.state.lock().await.drain();
        let count = drained.len();
        if count > 0 {
            info!(
                connector = self.factory.kind(),
                count,
                "Closing all pooled connections"
            );
            self.close_entries(drained, CloseReason::Shutdown).await;
        }
        self.closes.close();
        self.closes.wait().await;
        count
    }

    /// Whether `key` is cached; does not count as a use
    pub async fn contains(&self, key: &ResourceKey) -> bool {
        self.state.lock().await.entries.contains(key)
    }

    /// Number of cached entries
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Whether the pool holds no entries
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    /// Capacity units in use, including reservations for in-flight opens
    pub async fn capacity_used(&self) -> usize {
        self.state.lock().await.capacity_used
    }

    /// Counters and occupancy
    pub async fn stats(&self) -> PoolStats {
        let (entries, capacity_used) = {
            let state = self.state.lock().await;
            (state.entries.len(), state.capacity_used)
        };
        self.counters
            .snapshot(entries, capacity_used, self.config.global_max)
    }

    /// Per-entry diagnostics, least recently used first
    pub async fn entries_snapshot(&self) -> Vec<EntrySnapshot> {
        let now = Instant::now();
        let mut snapshot: Vec<EntrySnapshot> = self
            .state
            .lock()
            .await
            .entries
            .iter()
            .map(|(key, entry)| EntrySnapshot {
                key: key.clone(),
                capacity_units: entry.capacity_units(),
                idle_for: now.saturating_duration_since(entry.last_used_at()),
                opened_at: entry.opened_at(),
            })
            .collect();
        snapshot.reverse();
        snapshot
    }

    fn record_hit(&self, key: &ResourceKey) {
        self.counters.record_hit();
        debug!(
            connector = self.factory.kind(),
            key = %key,
            "Reusing pooled connection"
        );
    }

    async fn close_entries(
        &self,
        entries: Vec<PoolEntry<F::Handle, F::Config>>,
        reason: CloseReason,
    ) {
        let closing: Vec<JoinHandle<()>> = entries
            .into_iter()
            .map(|entry| self.spawn_close(entry, reason))
            .collect();
        for result in join_all(closing).await {
            if let Err(e) = result {
                warn!(
                    connector = self.factory.kind(),
                    error = %e,
                    "Close task ended abnormally"
                );
            }
        }
    }

    /// Close `entry` on a tracked task that outlives the calling future
    fn spawn_close(
        &self,
        entry: PoolEntry<F::Handle, F::Config>,
        reason: CloseReason,
    ) -> JoinHandle<()> {
        let factory = Arc::clone(&self.factory);
        let counters = Arc::clone(&self.counters);
        self.closes.spawn(close_entry(factory, counters, entry, reason))
    }
}

async fn close_entry<F: ConnectionFactory>(
    factory: Arc<F>,
    counters: Arc<PoolCounters>,
    entry: PoolEntry<F::Handle, F::Config>,
    reason: CloseReason,
) {
    let (key, handle) = entry.into_parts();
    match factory.close(handle).await {
        Ok(()) => {
            counters.record_close();
            debug!(
                connector = factory.kind(),
                key = %key,
                reason = %reason,
                "Closed pooled connection"
            );
        }
        Err(error) => {
            counters.record_close_failure();
            warn!(
                connector = factory.kind(),
                key = %key,
                reason = %reason,
                error = %error,
                "Failed to close pooled connection; entry dropped"
            );
        }
    }
}
