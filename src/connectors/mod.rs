// ABOUTME: Connector-side glue around the pool: lifecycle context and reusable factories
// ABOUTME: Each connector owns a ConnectorRuntime instead of module-level handle registries
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Connector integration.
//!
//! A connector builds one [`ConnectorRuntime`] at startup with its own
//! [`ConnectionFactory`](crate::pool::ConnectionFactory), calls
//! `on_server_create`/`on_server_destroy` from its MCP server lifecycle hooks,
//! `acquire` from tool invocations, and `shutdown` when the process stops.

/// Connector errors
pub mod errors;
/// Factory for REST-style connectors backed by a `reqwest` session
pub mod http;
/// Lifecycle context owning a pool and its reaper
pub mod runtime;

pub use errors::ConnectorError;
pub use http::{HttpSession, HttpSessionConfig, HttpSessionFactory};
pub use runtime::ConnectorRuntime;
