// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roster store trait for the persistence backend.

use async_trait::async_trait;

use crate::error::RelaycastError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatPatch, ChatRecord};

/// Typed CRUD over chat records.
///
/// Each operation is independently atomic; no cross-record transactions are
/// required by the access patterns of the engine.
#[async_trait]
pub trait RosterStore: PluginAdapter {
    /// Initializes the backend (migrations, connection).
    async fn initialize(&self) -> Result<(), RelaycastError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), RelaycastError>;

    /// Insert-or-update by id. On conflict the mutable fields (title, member
    /// count, type, link) are replaced; `videos_sent` and `date_added` are
    /// preserved.
    async fn upsert(&self, record: &ChatRecord) -> Result<(), RelaycastError>;

    /// Applies a partial update to one record. A no-op when the patch is
    /// empty or the id is unknown.
    async fn update_fields(&self, id: i64, patch: &ChatPatch) -> Result<(), RelaycastError>;

    /// Atomically increments the delivery counter for one chat.
    async fn increment_videos(&self, id: i64) -> Result<(), RelaycastError>;

    /// Returns the full roster ordered by title.
    async fn list_all(&self) -> Result<Vec<ChatRecord>, RelaycastError>;

    /// Fetches a single record by id.
    async fn get(&self, id: i64) -> Result<Option<ChatRecord>, RelaycastError>;
}
