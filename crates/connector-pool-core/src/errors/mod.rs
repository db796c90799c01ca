// ABOUTME: Error types for pool construction and configuration loading
// ABOUTME: Factory I/O errors are not wrapped here; they pass through to callers unchanged
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Error Types
//!
//! The pool manager itself only fails at construction time. Failures of a
//! connector's `open`/`close` calls use the connector's own error type and
//! are never converted into anything defined here.

/// Configuration error types
pub mod config;

pub use config::{ConfigError, ConfigResult};
