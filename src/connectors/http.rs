// ABOUTME: Connection factory producing authenticated reqwest sessions for REST-style connectors
// ABOUTME: Used by Grafana/Kubernetes-like backends; optional probe verifies reachability on open
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::errors::ConnectorError;
use crate::pool::ConnectionFactory;
use async_trait::async_trait;
use connector_pool_core::errors::ConfigError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("mcp-connector-pool/", env!("CARGO_PKG_VERSION"));

/// Per-tenant settings for an HTTP session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSessionConfig {
    /// Base URL of the backing service, e.g. `https://grafana.example.com/`
    pub base_url: String,
    /// Token sent as `Authorization: Bearer ...` on every request
    pub bearer_token: Option<String>,
    /// Timeout applied to each request made through the session
    pub request_timeout: Duration,
    /// Path requested once on open; any non-2xx answer fails the open
    pub probe_path: Option<String>,
}

impl HttpSessionConfig {
    /// Config with a 30 second timeout, no auth and no probe
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            request_timeout: Duration::from_secs(30),
            probe_path: None,
        }
    }

    /// Attach a bearer token
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Probe `path` when the session is opened
    #[must_use]
    pub fn with_probe(mut self, path: impl Into<String>) -> Self {
        self.probe_path = Some(path.into());
        self
    }
}

/// Authenticated client bound to one tenant's base URL
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    base_url: Url,
}

impl HttpSession {
    /// Underlying client, with auth and timeout already applied
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Base URL of the backing service
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base URL
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be joined onto the base URL
    pub fn url(&self, path: &str) -> Result<Url, ConnectorError> {
        self.base_url
            .join(path)
            .map_err(|e| ConfigError::invalid("path", e.to_string()).into())
    }
}

/// Factory opening one [`HttpSession`] per tenant
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    kind: String,
}

impl HttpSessionFactory {
    /// Factory labelled with the connector kind used in logs
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }

    fn build_session(config: &HttpSessionConfig) -> Result<HttpSession, ConnectorError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::invalid("base_url", e.to_string()))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ConfigError::invalid("bearer_token", "contains characters not allowed in a header")
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(HttpSession { client, base_url })
    }
}

#[async_trait]
impl ConnectionFactory for HttpSessionFactory {
    type Config = HttpSessionConfig;
    type Handle = HttpSession;
    type Error = ConnectorError;

    fn kind(&self) -> &str {
        &self.kind
    }

    async fn open(&self, config: &HttpSessionConfig) -> Result<HttpSession, ConnectorError> {
        let session = Self::build_session(config)?;

        if let Some(path) = &config.probe_path {
            let url = session.url(path)?;
            let response = session.client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ConnectorError::ProbeFailed {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            debug!(connector = %self.kind, url = %url, "Session probe succeeded");
        }

        Ok(session)
    }

    async fn close(&self, session: HttpSession) -> Result<(), ConnectorError> {
        // reqwest releases its connection pool when the last clone drops
        debug!(connector = %self.kind, base_url = %session.base_url, "Closing HTTP session");
        drop(session);
        Ok(())
    }
}
