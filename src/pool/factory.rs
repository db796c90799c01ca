// ABOUTME: ConnectionFactory trait that each connector implements for the pool
// ABOUTME: Opens and closes one backing-system handle; the pool owns caching and lifetimes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use async_trait::async_trait;
use std::error::Error;

/// Opens and closes handles to one kind of backing system
///
/// Both calls may perform network I/O. The pool never holds its structural
/// lock while they run, and it never imposes a deadline on them: apply any
/// timeout inside the implementation.
///
/// Handles are cloned out of the pool on every acquisition, so `Handle` is
/// expected to be a cheap shared reference (`Arc`, `sqlx::Pool`,
/// `reqwest::Client`, ...).
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    /// Connector-specific configuration needed to open a handle
    type Config: Clone + Send + Sync + 'static;

    /// Live connection, session or client
    type Handle: Clone + Send + Sync + 'static;

    /// Error raised by `open` or `close`, returned to callers unchanged
    type Error: Error + Send + Sync + 'static;

    /// Connector kind used in log fields (e.g. "postgres", "grafana")
    fn kind(&self) -> &str;

    /// Open a new handle from `config`
    ///
    /// # Errors
    ///
    /// Returns the backing system's error if the handle cannot be opened
    async fn open(&self, config: &Self::Config) -> Result<Self::Handle, Self::Error>;

    /// Release the resources behind `handle`
    ///
    /// The pool drops its entry whatever this returns.
    ///
    /// # Errors
    ///
    /// Returns the backing system's error if shutdown was not clean
    async fn close(&self, handle: Self::Handle) -> Result<(), Self::Error>;
}
