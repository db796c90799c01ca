// ABOUTME: Error type for the bundled connector factories
// ABOUTME: Wraps configuration problems and HTTP client failures with the probed URL
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use connector_pool_core::errors::ConfigError;
use thiserror::Error;

/// Errors raised while opening or closing a connector session
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Connector configuration is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built or the request failed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The health probe answered with a non-success status
    #[error("probe of {url} returned status {status}")]
    ProbeFailed {
        /// Probed URL
        url: String,
        /// HTTP status code
        status: u16,
    },
}

impl ConnectorError {
    /// Whether retrying the same call later may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::ProbeFailed { status, .. } => *status >= 500 || *status == 429,
        }
    }
}
