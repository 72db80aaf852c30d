// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and sensible concurrency limits.

use crate::diagnostic::ConfigError;
use crate::model::RelaycastConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RelaycastConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.broadcast.max_concurrency == 0 {
        errors.push(ConfigError::Validation {
            message: "broadcast.max_concurrency must be at least 1".to_string(),
        });
    }

    if let Some(min) = config.roster.min_members
        && min < 0
    {
        errors.push(ConfigError::Validation {
            message: format!("roster.min_members must be non-negative, got {min}"),
        });
    }

    // The operator gate is meaningless without credentials once Telegram is on.
    if config.telegram.bot_token.is_some() {
        if config.telegram.operator_password.is_empty() {
            errors.push(ConfigError::Validation {
                message: "telegram.operator_password must be set when telegram.bot_token is set"
                    .to_string(),
            });
        }
        if config.telegram.leave_passphrase.is_empty() {
            errors.push(ConfigError::Validation {
                message: "telegram.leave_passphrase must be set when telegram.bot_token is set"
                    .to_string(),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
