// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger trait wrapping the external chat platform's primitives.

use async_trait::async_trait;

use crate::error::RelaycastError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatInfo, VideoAsset};

/// Outbound capability of the chat platform.
///
/// Every call is an independent network round trip; callers treat failures as
/// transient and contain them at per-chat granularity.
#[async_trait]
pub trait Messenger: PluginAdapter {
    /// Delivers a video asset (by platform file handle) to a chat.
    async fn send_video(&self, chat_id: i64, asset: &VideoAsset) -> Result<(), RelaycastError>;

    /// Queries the current member count of a chat.
    async fn member_count(&self, chat_id: i64) -> Result<i64, RelaycastError>;

    /// Queries title, kind, and username of a chat.
    ///
    /// Fails when the chat is unreachable or the bot is no longer a member,
    /// which the reconciler uses to reclassify the record.
    async fn chat_info(&self, chat_id: i64) -> Result<ChatInfo, RelaycastError>;

    /// Requests that the bot leave a chat.
    async fn leave_chat(&self, chat_id: i64) -> Result<(), RelaycastError>;

    /// Sends a plain text message (operator replies, prompts).
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), RelaycastError>;

    /// Sends an in-memory file as a document (report export).
    async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<(), RelaycastError>;
}
