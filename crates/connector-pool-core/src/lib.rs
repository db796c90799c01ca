// ABOUTME: Core types and constants for the multi-tenant connector pool
// ABOUTME: Foundation crate with resource keys, configuration errors, and pool defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Connector Pool Core
//!
//! Foundation crate shared by the pool manager and every connector that
//! plugs a connection factory into it. It is meant to change rarely.
//!
//! ## Modules
//!
//! - **errors**: configuration errors raised while building a pool
//! - **constants**: pool defaults and environment variable names
//! - **models**: the `ResourceKey` identifying a tenant/server pool entry

/// Error types shared across the workspace
pub mod errors;

/// Pool defaults, environment variable names and service identifiers
pub mod constants;

/// Shared data models
pub mod models;
