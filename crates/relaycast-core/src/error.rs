// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the relaycast workspace.

use thiserror::Error;

/// The primary error type used across adapter traits and engine operations.
#[derive(Debug, Error)]
pub enum RelaycastError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Roster store errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messenger errors (send failure, metadata lookup failure, rate limiting).
    #[error("messenger error: {message}")]
    Messenger {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An operator attempted a gated action without authorization.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelaycastError {
    /// Shorthand for a messenger error without an underlying source.
    pub fn messenger(message: impl Into<String>) -> Self {
        Self::Messenger {
            message: message.into(),
            source: None,
        }
    }
}
