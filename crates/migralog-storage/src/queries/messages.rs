// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat message CRUD operations.

use rusqlite::params;

use migralog_core::MigralogError;

use crate::database::Database;
use crate::models::ChatMessage;

/// Insert a new message.
pub async fn insert_message(db: &Database, msg: &ChatMessage) -> Result<(), MigralogError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, userid, content, is_from_user, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    msg.id,
                    msg.userid,
                    msg.content,
                    msg.is_from_user,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get messages for an identity in chronological order.
pub async fn messages_for_user(
    db: &Database,
    userid: &str,
    limit: Option<i64>,
) -> Result<Vec<ChatMessage>, MigralogError> {
    let userid = userid.to_string();
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            let map_row = |row: &rusqlite::Row<'_>| {
                Ok(ChatMessage {
                    id: row.get(0)?,
                    userid: row.get(1)?,
                    content: row.get(2)?,
                    is_from_user: row.get(3)?,
                    created_at: row.get(4)?,
                })
            };
            match limit {
                Some(lim) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, userid, content, is_from_user, created_at
                         FROM messages WHERE userid = ?1
                         ORDER BY created_at ASC LIMIT ?2",
                    )?;
                    let rows = stmt.query_map(params![userid, lim], map_row)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, userid, content, is_from_user, created_at
                         FROM messages WHERE userid = ?1
                         ORDER BY created_at ASC",
                    )?;
                    let rows = stmt.query_map(params![userid], map_row)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
