// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Slotwise scheduling engine.

use thiserror::Error;

/// The primary error type used across all Slotwise collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum SlotwiseError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Calendar or handover store errors (connection failure, query failure).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Notification gateway errors (delivery failure, rejected recipient).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A store or gateway call did not complete in time.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// A recurrence rule violates its contract (zero interval, out-of-range filters).
    #[error("invalid recurrence rule: {0}")]
    InvalidRule(String),

    /// Caller supplied input that cannot be processed (empty window, zero duration).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SlotwiseError {
    /// Wraps any error as a store failure.
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SlotwiseError::Store {
            source: Box::new(err),
        }
    }
}
