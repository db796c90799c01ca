// ABOUTME: Connector lifecycle context that owns one PoolManager and its reaper task
// ABOUTME: Maps MCP server create/destroy hooks and process shutdown onto pool operations
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::PoolConfig;
use crate::pool::{ConnectionFactory, PoolManager, ReaperHandle};
use connector_pool_core::errors::ConfigResult;
use connector_pool_core::models::ResourceKey;
use std::sync::Arc;
use tracing::info;

/// Pool plus reaper for one connector, owned by that connector's lifecycle
pub struct ConnectorRuntime<F: ConnectionFactory> {
    pools: Arc<PoolManager<F>>,
    reaper: ReaperHandle,
}

impl<F: ConnectionFactory> ConnectorRuntime<F> {
    /// Build the pool and start its reaper on the current tokio runtime
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid
    pub fn start(factory: F, config: PoolConfig) -> ConfigResult<Self> {
        let pools = Arc::new(PoolManager::with_config(factory, config)?);
        let reaper = pools.spawn_reaper();
        Ok(Self { pools, reaper })
    }

    /// Shared pool, for handing to tool handlers
    #[must_use]
    pub const fn pools(&self) -> &Arc<PoolManager<F>> {
        &self.pools
    }

    /// MCP server created: open its connection ahead of the first tool call
    ///
    /// # Errors
    ///
    /// Returns the factory's error if the connection cannot be opened
    pub async fn on_server_create(
        &self,
        key: &ResourceKey,
        config: &F::Config,
    ) -> Result<(), F::Error> {
        self.pools.acquire(key, config).await?;
        info!(connector = self.pools.factory().kind(), key = %key, "Server connection ready");
        Ok(())
    }

    /// Tool invocation: get the tenant's live handle
    ///
    /// # Errors
    ///
    /// Returns the factory's error if the connection cannot be opened
    pub async fn acquire(
        &self,
        key: &ResourceKey,
        config: &F::Config,
    ) -> Result<F::Handle, F::Error> {
        self.pools.acquire(key, config).await
    }

    /// MCP server destroyed: close its connection now
    pub async fn on_server_destroy(&self, key: &ResourceKey) -> bool {
        let released = self.pools.release(key).await;
        info!(
            connector = self.pools.factory().kind(),
            key = %key,
            released,
            "Server connection torn down"
        );
        released
    }

    /// Stop the reaper, then close every pooled connection
    ///
    /// Returns how many connections were closed.
    pub async fn shutdown(self) -> usize {
        self.reaper.shutdown().await;
        self.pools.close_all().await
    }
}
