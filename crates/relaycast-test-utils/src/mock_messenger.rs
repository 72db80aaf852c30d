// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messenger adapter for deterministic testing.
//!
//! `MockMessenger` implements `Messenger` with scriptable per-chat failures
//! and full call capture, so engine tests can assert exactly which chats
//! were contacted and in what way.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use relaycast_core::traits::{Messenger, PluginAdapter};
use relaycast_core::types::{AdapterType, ChatInfo, ChatType, HealthStatus, VideoAsset};
use relaycast_core::RelaycastError;

/// A mock messenger for testing.
///
/// Every outbound call is captured for later assertion. Individual chats can
/// be scripted to fail sends, lookups, or leaves to exercise the per-chat
/// error containment of the engine.
pub struct MockMessenger {
    sent_videos: Arc<Mutex<Vec<(i64, VideoAsset)>>>,
    sent_texts: Arc<Mutex<Vec<(i64, String)>>>,
    sent_documents: Arc<Mutex<Vec<(i64, String, Vec<u8>)>>>,
    left_chats: Arc<Mutex<Vec<i64>>>,
    member_counts: Arc<Mutex<HashMap<i64, i64>>>,
    chat_infos: Arc<Mutex<HashMap<i64, ChatInfo>>>,
    failing_sends: Arc<Mutex<HashSet<i64>>>,
    failing_lookups: Arc<Mutex<HashSet<i64>>>,
    failing_leaves: Arc<Mutex<HashSet<i64>>>,
}

impl MockMessenger {
    /// Create a new mock messenger with no scripted state.
    pub fn new() -> Self {
        Self {
            sent_videos: Arc::new(Mutex::new(Vec::new())),
            sent_texts: Arc::new(Mutex::new(Vec::new())),
            sent_documents: Arc::new(Mutex::new(Vec::new())),
            left_chats: Arc::new(Mutex::new(Vec::new())),
            member_counts: Arc::new(Mutex::new(HashMap::new())),
            chat_infos: Arc::new(Mutex::new(HashMap::new())),
            failing_sends: Arc::new(Mutex::new(HashSet::new())),
            failing_lookups: Arc::new(Mutex::new(HashSet::new())),
            failing_leaves: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Script `send_video` to fail for the given chat.
    pub async fn fail_send_for(&self, chat_id: i64) {
        self.failing_sends.lock().await.insert(chat_id);
    }

    /// Script `member_count` and `chat_info` to fail for the given chat.
    pub async fn fail_lookup_for(&self, chat_id: i64) {
        self.failing_lookups.lock().await.insert(chat_id);
    }

    /// Script `leave_chat` to fail for the given chat.
    pub async fn fail_leave_for(&self, chat_id: i64) {
        self.failing_leaves.lock().await.insert(chat_id);
    }

    /// Set the member count returned for a chat.
    pub async fn set_member_count(&self, chat_id: i64, count: i64) {
        self.member_counts.lock().await.insert(chat_id, count);
    }

    /// Set the chat info returned for a chat.
    pub async fn set_chat_info(&self, chat_id: i64, info: ChatInfo) {
        self.chat_infos.lock().await.insert(chat_id, info);
    }

    /// All videos delivered so far, as (chat_id, asset) pairs in send order.
    pub async fn sent_videos(&self) -> Vec<(i64, VideoAsset)> {
        self.sent_videos.lock().await.clone()
    }

    /// All text messages delivered so far.
    pub async fn sent_texts(&self) -> Vec<(i64, String)> {
        self.sent_texts.lock().await.clone()
    }

    /// All documents delivered so far, as (chat_id, filename, bytes).
    pub async fn sent_documents(&self) -> Vec<(i64, String, Vec<u8>)> {
        self.sent_documents.lock().await.clone()
    }

    /// All chats the messenger was asked to leave, in call order.
    pub async fn left_chats(&self) -> Vec<i64> {
        self.left_chats.lock().await.clone()
    }

    /// The last text sent to the given chat, if any.
    pub async fn last_text_to(&self, chat_id: i64) -> Option<String> {
        self.sent_texts
            .lock()
            .await
            .iter()
            .rev()
            .find(|(id, _)| *id == chat_id)
            .map(|(_, text)| text.clone())
    }
}

impl Default for MockMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockMessenger {
    fn name(&self) -> &str {
        "mock-messenger"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Messenger
    }

    async fn health_check(&self) -> Result<HealthStatus, RelaycastError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelaycastError> {
        Ok(())
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_video(&self, chat_id: i64, asset: &VideoAsset) -> Result<(), RelaycastError> {
        if self.failing_sends.lock().await.contains(&chat_id) {
            return Err(RelaycastError::messenger(format!(
                "scripted send failure for chat {chat_id}"
            )));
        }
        self.sent_videos.lock().await.push((chat_id, asset.clone()));
        Ok(())
    }

    async fn member_count(&self, chat_id: i64) -> Result<i64, RelaycastError> {
        if self.failing_lookups.lock().await.contains(&chat_id) {
            return Err(RelaycastError::messenger(format!(
                "scripted lookup failure for chat {chat_id}"
            )));
        }
        Ok(*self.member_counts.lock().await.get(&chat_id).unwrap_or(&0))
    }

    async fn chat_info(&self, chat_id: i64) -> Result<ChatInfo, RelaycastError> {
        if self.failing_lookups.lock().await.contains(&chat_id) {
            return Err(RelaycastError::messenger(format!(
                "scripted lookup failure for chat {chat_id}"
            )));
        }
        Ok(self
            .chat_infos
            .lock()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or(ChatInfo {
                title: None,
                kind: ChatType::Unknown,
                username: None,
            }))
    }

    async fn leave_chat(&self, chat_id: i64) -> Result<(), RelaycastError> {
        if self.failing_leaves.lock().await.contains(&chat_id) {
            return Err(RelaycastError::messenger(format!(
                "scripted leave failure for chat {chat_id}"
            )));
        }
        self.left_chats.lock().await.push(chat_id);
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), RelaycastError> {
        self.sent_texts.lock().await.push((chat_id, text.to_owned()));
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<(), RelaycastError> {
        self.sent_documents
            .lock()
            .await
            .push((chat_id, filename.to_owned(), data));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> VideoAsset {
        VideoAsset {
            file_id: "FILE".into(),
            caption: None,
        }
    }

    #[tokio::test]
    async fn captures_sent_videos_in_order() {
        let messenger = MockMessenger::new();
        messenger.send_video(1, &asset()).await.unwrap();
        messenger.send_video(2, &asset()).await.unwrap();

        let sent = messenger.sent_videos().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, 1);
        assert_eq!(sent[1].0, 2);
    }

    #[tokio::test]
    async fn scripted_send_failure_only_hits_target_chat() {
        let messenger = MockMessenger::new();
        messenger.fail_send_for(2).await;

        assert!(messenger.send_video(1, &asset()).await.is_ok());
        assert!(messenger.send_video(2, &asset()).await.is_err());
        assert_eq!(messenger.sent_videos().await.len(), 1);
    }

    #[tokio::test]
    async fn scripted_lookup_failure_covers_count_and_info() {
        let messenger = MockMessenger::new();
        messenger.fail_lookup_for(5).await;

        assert!(messenger.member_count(5).await.is_err());
        assert!(messenger.chat_info(5).await.is_err());
        assert!(messenger.member_count(6).await.is_ok());
    }

    #[tokio::test]
    async fn leave_is_recorded() {
        let messenger = MockMessenger::new();
        messenger.leave_chat(9).await.unwrap();
        assert_eq!(messenger.left_chats().await, vec![9]);
    }

    #[tokio::test]
    async fn last_text_to_finds_most_recent() {
        let messenger = MockMessenger::new();
        messenger.send_message(1, "first").await.unwrap();
        messenger.send_message(1, "second").await.unwrap();
        messenger.send_message(2, "other").await.unwrap();

        assert_eq!(messenger.last_text_to(1).await.as_deref(), Some("second"));
        assert_eq!(messenger.last_text_to(3).await, None);
    }
}
