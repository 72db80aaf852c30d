// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the relaycast bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level relaycast configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelaycastConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Roster store backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fan-out delivery settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Roster reconciliation policy settings.
    #[serde(default)]
    pub roster: RosterConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "relaycast".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables the Telegram adapter.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Password an operator must present to unlock broadcast commands.
    #[serde(default)]
    pub operator_password: String,

    /// Secondary passphrase confirming the bulk "leave all chats" action.
    #[serde(default)]
    pub leave_passphrase: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            operator_password: String::new(),
            leave_passphrase: String::new(),
        }
    }
}

/// Roster store backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("relaycast").join("relaycast.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("relaycast.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Fan-out delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastConfig {
    /// Maximum chats delivered to concurrently during broadcast, refresh,
    /// and bulk leave. Bounded to stay under platform rate limits.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Caption used when the operator sends a video without one.
    #[serde(default = "default_caption")]
    pub default_caption: String,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            default_caption: default_caption(),
        }
    }
}

fn default_max_concurrency() -> usize {
    8
}

fn default_caption() -> String {
    "New video".to_string()
}

/// Roster reconciliation policy configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RosterConfig {
    /// Minimum member count a chat must have to stay on the roster. When a
    /// membership event observes fewer members, the bot marks the chat left
    /// and leaves it. `None` disables the policy (the default).
    #[serde(default)]
    pub min_members: Option<i64>,
}
