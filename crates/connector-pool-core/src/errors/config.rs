// ABOUTME: Configuration errors raised when pool limits are missing or out of range
// ABOUTME: Carries the offending setting name so operators can fix the environment quickly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use thiserror::Error;

/// Result alias for configuration loading and validation
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while validating pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A limit that must be strictly positive was zero
    #[error("pool setting '{setting}' must be greater than zero")]
    NonPositive {
        /// Name of the offending setting
        setting: &'static str,
    },

    /// A connector-specific setting is malformed
    #[error("invalid connector setting '{setting}': {reason}")]
    Invalid {
        /// Name of the offending setting
        setting: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Create a "must be positive" error
    #[must_use]
    pub const fn non_positive(setting: &'static str) -> Self {
        Self::NonPositive { setting }
    }

    /// Create an "invalid setting" error
    #[must_use]
    pub fn invalid(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            setting: setting.into(),
            reason: reason.into(),
        }
    }

    /// Name of the setting this error refers to
    #[must_use]
    pub fn setting(&self) -> &str {
        match self {
            Self::NonPositive { setting } => setting,
            Self::Invalid { setting, .. } => setting,
        }
    }
}
