// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat record CRUD operations.

use relaycast_core::{ChatPatch, ChatRecord, ChatType, RelaycastError};
use rusqlite::params;

use crate::database::Database;

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatRecord> {
    let chat_type: String = row.get(5)?;
    Ok(ChatRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        member_count: row.get(2)?,
        videos_sent: row.get(3)?,
        date_added: row.get(4)?,
        // FromStr is infallible: unmatched strings land in the catch-all.
        chat_type: chat_type.parse().unwrap_or(ChatType::Unknown),
        link: row.get(6)?,
    })
}

/// Insert a chat record, or update its mutable fields on id conflict.
///
/// `videos` and `date_added` are deliberately absent from the UPDATE arm:
/// the counter only moves through [`increment_videos`] and the insertion
/// timestamp never changes.
pub async fn upsert(db: &Database, record: &ChatRecord) -> Result<(), RelaycastError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO chats (id, title, members, type, link)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (id) DO UPDATE
                 SET title = excluded.title,
                     members = excluded.members,
                     type = excluded.type,
                     link = excluded.link",
                params![
                    record.id,
                    record.title,
                    record.member_count,
                    record.chat_type.to_string(),
                    record.link,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply a partial update to one chat record.
///
/// Builds the SET clause dynamically from the populated patch fields. A
/// no-op when the patch is empty or the id does not exist.
pub async fn update_fields(
    db: &Database,
    id: i64,
    patch: &ChatPatch,
) -> Result<(), RelaycastError> {
    if patch.is_empty() {
        return Ok(());
    }
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let mut sets: Vec<&str> = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(title) = patch.title {
                sets.push("title = ?");
                values.push(Box::new(title));
            }
            if let Some(members) = patch.member_count {
                sets.push("members = ?");
                values.push(Box::new(members));
            }
            if let Some(chat_type) = patch.chat_type {
                sets.push("type = ?");
                values.push(Box::new(chat_type.to_string()));
            }
            if let Some(link) = patch.link {
                sets.push("link = ?");
                values.push(Box::new(link));
            }
            values.push(Box::new(id));

            let sql = format!("UPDATE chats SET {} WHERE id = ?", sets.join(", "));
            let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, &params[..])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically increment the delivery counter for one chat.
///
/// The read-modify-write happens inside a single UPDATE on the single
/// writer thread, so concurrent increments never lose updates.
pub async fn increment_videos(db: &Database, id: i64) -> Result<(), RelaycastError> {
    db.connection()
        .call(move |conn| {
            conn.execute("UPDATE chats SET videos = videos + 1 WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List the full roster ordered by title.
pub async fn list_all(db: &Database) -> Result<Vec<ChatRecord>, RelaycastError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, members, videos, date_added, type, link
                 FROM chats ORDER BY title",
            )?;
            let rows = stmt.query_map([], row_to_record)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a single chat record by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<ChatRecord>, RelaycastError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, members, videos, date_added, type, link
                 FROM chats WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_record);
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
