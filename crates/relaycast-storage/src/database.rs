// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread: `Database` wraps one `tokio_rusqlite::Connection`, query functions
//! accept `&Database` and go through `conn.call()`. This is what makes
//! per-row updates (notably the delivery counter increment) linearizable
//! without explicit locking, and it eliminates SQLITE_BUSY under concurrent
//! access. Do NOT create additional Connection instances for writes.

use relaycast_core::RelaycastError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Handle to the single SQLite connection backing the roster store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path`, apply PRAGMAs, and
    /// run pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, RelaycastError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| RelaycastError::Storage { source: Box::new(e) })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(tokio_rusqlite::Error::from)
            .map_err(map_tr_err)?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.pragma_update(None, "foreign_keys", true)?;
            conn.pragma_update(None, "busy_timeout", 5000_i64)?;
            crate::migrations::run_migrations(conn)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
            Ok(())
        })
        .await
        .map_err(
            |e: tokio_rusqlite::Error<Box<dyn std::error::Error + Send + Sync>>| match e {
                tokio_rusqlite::Error::Error(source) => RelaycastError::Storage { source },
                other => RelaycastError::Storage { source: other.to_string().into() },
            },
        )?;

        debug!(path, wal_mode, "roster database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and release the connection.
    pub async fn close(&self) -> Result<(), RelaycastError> {
        self.conn
            .call(|conn| {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> RelaycastError {
    RelaycastError::Storage { source: Box::new(e) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("open.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        assert!(path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/roster.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        assert!(path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn migrations_create_chats_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();

        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'chats'",
                    [],
                    |row| row.get(0),
                )?;
                Ok::<_, tokio_rusqlite::rusqlite::Error>(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        {
            let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
            db.close().await.unwrap();
        }
        // Second open re-runs the migration runner against an up-to-date DB.
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();
    }
}
