// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the relaycast broadcast bot.
//!
//! Provides the foundational trait definitions, error type, and domain types
//! used throughout the workspace. The messenger and storage adapters
//! implement traits defined here; the engine crate consumes them.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RelaycastError;
pub use types::{
    AdapterType, BotEvent, ChatInfo, ChatPatch, ChatRecord, ChatType, HealthStatus,
    MembershipChange, VideoAsset,
};

pub use traits::{Messenger, PluginAdapter, RosterStore};
