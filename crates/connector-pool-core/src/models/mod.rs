// ABOUTME: Shared data models for the connector pool
// ABOUTME: Currently the resource key newtype used to address pool entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Resource key newtype
pub mod resource_key;

pub use resource_key::ResourceKey;
