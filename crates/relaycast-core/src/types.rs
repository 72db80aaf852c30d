// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across adapter traits and the broadcast engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a [`crate::traits::PluginAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Messenger,
    Storage,
}

/// Chat classification stored on every roster record.
///
/// Open enumeration: the structural kinds Telegram reports, the terminal
/// markers `left`/`kicked`, and a catch-all for raw membership-status strings
/// the platform may introduce. Terminal markers override the structural kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ChatType {
    Channel,
    Group,
    Supergroup,
    Private,
    Left,
    Kicked,
    Unknown,
    /// Raw status string not covered by the variants above.
    #[strum(default, to_string = "{0}")]
    Other(String),
}

impl ChatType {
    /// Terminal types mark a chat that no longer receives broadcasts.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatType::Left | ChatType::Kicked)
    }
}

impl Default for ChatType {
    fn default() -> Self {
        ChatType::Unknown
    }
}

/// One roster entry: a chat the bot belongs to (or used to belong to).
///
/// Records are never physically deleted; chats the bot has left are retained
/// with a terminal [`ChatType`] for audit and reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRecord {
    /// Platform-assigned identifier, primary key.
    pub id: i64,
    /// Display name; a placeholder is stored when the platform gives none.
    pub title: String,
    /// Last-observed member count; `-1` means the lookup failed.
    pub member_count: i64,
    /// Successful deliveries to this chat. Only ever increases.
    pub videos_sent: i64,
    /// Set once at first insertion, immutable thereafter.
    pub date_added: String,
    pub chat_type: ChatType,
    /// Public URL when the chat has a username, else empty.
    pub link: String,
}

/// Partial update for a roster record. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ChatPatch {
    pub title: Option<String>,
    pub member_count: Option<i64>,
    pub chat_type: Option<ChatType>,
    pub link: Option<String>,
}

impl ChatPatch {
    /// A patch that only reclassifies the chat type.
    pub fn chat_type(chat_type: ChatType) -> Self {
        Self {
            chat_type: Some(chat_type),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.member_count.is_none()
            && self.chat_type.is_none()
            && self.link.is_none()
    }
}

/// Chat metadata returned by a [`crate::traits::Messenger`] lookup.
#[derive(Debug, Clone)]
pub struct ChatInfo {
    pub title: Option<String>,
    pub kind: ChatType,
    pub username: Option<String>,
}

/// An opaque reference to a video asset already uploaded to the platform,
/// plus the caption to deliver with it.
#[derive(Debug, Clone)]
pub struct VideoAsset {
    pub file_id: String,
    pub caption: Option<String>,
}

/// A membership-change notification for the bot itself in some chat.
#[derive(Debug, Clone)]
pub struct MembershipChange {
    pub chat_id: i64,
    pub title: Option<String>,
    pub username: Option<String>,
    /// The bot's new status, already mapped onto the roster enumeration
    /// (structural kind when still a member, terminal marker otherwise).
    pub new_status: ChatType,
}

/// Inbound events the messenger adapter feeds into the event loop.
#[derive(Debug, Clone)]
pub enum BotEvent {
    /// The bot was added to, removed from, or repositioned in a chat.
    MembershipChanged(MembershipChange),
    /// An operator DM'd a video to broadcast.
    VideoReceived { operator_id: i64, asset: VideoAsset },
    /// An operator DM'd a text command or password.
    TextReceived { operator_id: i64, text: String },
}

/// Derive the public link for a chat from its username, if any.
pub fn link_for_username(username: Option<&str>) -> String {
    match username {
        Some(name) if !name.is_empty() => format!("https://t.me/{name}"),
        _ => String::new(),
    }
}

/// Placeholder title stored when the platform reports none.
pub const UNTITLED: &str = "Untitled";
