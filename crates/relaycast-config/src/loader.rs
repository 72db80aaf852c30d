// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./relaycast.toml` > `~/.config/relaycast/relaycast.toml`
//! > `/etc/relaycast/relaycast.toml` with environment variable overrides via
//! the `RELAYCAST_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RelaycastConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/relaycast/relaycast.toml` (system-wide)
/// 3. `~/.config/relaycast/relaycast.toml` (user XDG config)
/// 4. `./relaycast.toml` (local directory)
/// 5. `RELAYCAST_*` environment variables
pub fn load_config() -> Result<RelaycastConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RelaycastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaycastConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RelaycastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaycastConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RelaycastConfig::default()))
        .merge(Toml::file("/etc/relaycast/relaycast.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("relaycast/relaycast.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("relaycast.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `RELAYCAST_TELEGRAM_BOT_TOKEN` must map
/// to `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("RELAYCAST_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: RELAYCAST_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let mapped = key
            .as_str()
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("broadcast_", "broadcast.", 1)
            .replacen("roster_", "roster.", 1);
        mapped.into()
    })
}
