// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory roster store for deterministic testing.
//!
//! `MemoryRoster` implements `RosterStore` over a map, honoring the same
//! contract as the SQLite store: upserts preserve the delivery counter and
//! insertion date, listings come back ordered by title, records are never
//! deleted.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use relaycast_core::traits::{PluginAdapter, RosterStore};
use relaycast_core::types::{AdapterType, ChatPatch, ChatRecord, HealthStatus};
use relaycast_core::RelaycastError;

/// An in-memory roster store for testing.
pub struct MemoryRoster {
    records: Arc<Mutex<BTreeMap<i64, ChatRecord>>>,
}

impl MemoryRoster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Create a roster pre-populated with the given records.
    pub async fn with_records(records: Vec<ChatRecord>) -> Self {
        let roster = Self::new();
        {
            let mut map = roster.records.lock().await;
            for record in records {
                map.insert(record.id, record);
            }
        }
        roster
    }
}

impl Default for MemoryRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MemoryRoster {
    fn name(&self) -> &str {
        "memory-roster"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RelaycastError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelaycastError> {
        Ok(())
    }
}

#[async_trait]
impl RosterStore for MemoryRoster {
    async fn initialize(&self) -> Result<(), RelaycastError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), RelaycastError> {
        Ok(())
    }

    async fn upsert(&self, record: &ChatRecord) -> Result<(), RelaycastError> {
        let mut map = self.records.lock().await;
        match map.get_mut(&record.id) {
            Some(existing) => {
                // Counter and insertion date survive re-registration.
                existing.title = record.title.clone();
                existing.member_count = record.member_count;
                existing.chat_type = record.chat_type.clone();
                existing.link = record.link.clone();
            }
            None => {
                let mut fresh = record.clone();
                if fresh.date_added.is_empty() {
                    fresh.date_added = chrono::Utc::now().to_rfc3339();
                }
                map.insert(fresh.id, fresh);
            }
        }
        Ok(())
    }

    async fn update_fields(&self, id: i64, patch: &ChatPatch) -> Result<(), RelaycastError> {
        let mut map = self.records.lock().await;
        if let Some(record) = map.get_mut(&id) {
            if let Some(title) = &patch.title {
                record.title = title.clone();
            }
            if let Some(members) = patch.member_count {
                record.member_count = members;
            }
            if let Some(chat_type) = &patch.chat_type {
                record.chat_type = chat_type.clone();
            }
            if let Some(link) = &patch.link {
                record.link = link.clone();
            }
        }
        Ok(())
    }

    async fn increment_videos(&self, id: i64) -> Result<(), RelaycastError> {
        let mut map = self.records.lock().await;
        if let Some(record) = map.get_mut(&id) {
            record.videos_sent += 1;
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ChatRecord>, RelaycastError> {
        let map = self.records.lock().await;
        let mut records: Vec<ChatRecord> = map.values().cloned().collect();
        records.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(records)
    }

    async fn get(&self, id: i64) -> Result<Option<ChatRecord>, RelaycastError> {
        Ok(self.records.lock().await.get(&id).cloned())
    }
}
