// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the RosterStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use relaycast_config::model::StorageConfig;
use relaycast_core::{
    AdapterType, ChatPatch, ChatRecord, HealthStatus, PluginAdapter, RelaycastError, RosterStore,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed roster store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query module. The database is lazily initialized on the first call
/// to [`RosterStore::initialize`].
pub struct SqliteRoster {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteRoster {
    /// Create a new SqliteRoster with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, RelaycastError> {
        self.db.get().ok_or_else(|| RelaycastError::Storage {
            source: "roster store not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteRoster {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RelaycastError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelaycastError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl RosterStore for SqliteRoster {
    async fn initialize(&self) -> Result<(), RelaycastError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| RelaycastError::Storage {
            source: "roster store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite roster store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RelaycastError> {
        self.db()?.close().await
    }

    async fn upsert(&self, record: &ChatRecord) -> Result<(), RelaycastError> {
        queries::chats::upsert(self.db()?, record).await
    }

    async fn update_fields(&self, id: i64, patch: &ChatPatch) -> Result<(), RelaycastError> {
        queries::chats::update_fields(self.db()?, id, patch).await
    }

    async fn increment_videos(&self, id: i64) -> Result<(), RelaycastError> {
        queries::chats::increment_videos(self.db()?, id).await
    }

    async fn list_all(&self) -> Result<Vec<ChatRecord>, RelaycastError> {
        queries::chats::list_all(self.db()?).await
    }

    async fn get(&self, id: i64) -> Result<Option<ChatRecord>, RelaycastError> {
        queries::chats::get(self.db()?, id).await
    }
}
