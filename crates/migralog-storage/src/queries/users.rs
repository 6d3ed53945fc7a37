// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile CRUD operations.

use rusqlite::params;

use migralog_core::MigralogError;

use crate::database::Database;
use crate::models::{ProfilePatch, UserProfile};

/// Insert a new profile row.
pub async fn insert_user(db: &Database, profile: &UserProfile) -> Result<(), MigralogError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (userid, language, name, gender, birthdate, reminder_time, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    profile.userid,
                    profile.language,
                    profile.name,
                    profile.gender,
                    profile.birthdate,
                    profile.reminder_time,
                    profile.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a profile by identity.
pub async fn get_user(db: &Database, userid: &str) -> Result<Option<UserProfile>, MigralogError> {
    let userid = userid.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT userid, language, name, gender, birthdate, reminder_time, created_at
                 FROM users WHERE userid = ?1",
            )?;
            let result = stmt.query_row(params![userid], |row| {
                Ok(UserProfile {
                    userid: row.get(0)?,
                    language: row.get(1)?,
                    name: row.get(2)?,
                    gender: row.get(3)?,
                    birthdate: row.get(4)?,
                    reminder_time: row.get(5)?,
                    created_at: row.get(6)?,
                })
            });
            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply a partial profile update. Absent patch fields are left untouched.
pub async fn update_user(
    db: &Database,
    userid: &str,
    patch: &ProfilePatch,
) -> Result<(), MigralogError> {
    if patch.is_empty() {
        return Ok(());
    }

    let userid = userid.to_string();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let mut columns: Vec<&'static str> = Vec::new();
            let mut values: Vec<rusqlite::types::Value> = Vec::new();
            for (column, value) in [
                ("name", patch.name),
                ("gender", patch.gender),
                ("birthdate", patch.birthdate),
                ("reminder_time", patch.reminder_time),
                ("language", patch.language),
            ] {
                if let Some(v) = value {
                    columns.push(column);
                    values.push(rusqlite::types::Value::Text(v));
                }
            }

            let sets = columns
                .iter()
                .map(|c| format!("{c} = ?"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("UPDATE users SET {sets} WHERE userid = ?");
            values.push(rusqlite::types::Value::Text(userid));
            conn.execute(&sql, rusqlite::params_from_iter(values))?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("users.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_profile(userid: &str) -> UserProfile {
        UserProfile {
            userid: userid.to_string(),
            language: "ru".to_string(),
            name: None,
            gender: None,
            birthdate: None,
            reminder_time: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        insert_user(&db, &make_profile("u1")).await.unwrap();

        let profile = get_user(&db, "u1").await.unwrap().unwrap();
        assert_eq!(profile.userid, "u1");
        assert_eq!(profile.language, "ru");
        assert!(profile.name.is_none());
    }

    #[tokio::test]
    async fn get_unknown_user_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_user(&db, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_update_leaves_other_fields() {
        let (db, _dir) = setup_db().await;
        let mut profile = make_profile("u1");
        profile.name = Some("Айгерим".into());
        insert_user(&db, &profile).await.unwrap();

        update_user(
            &db,
            "u1",
            &ProfilePatch {
                birthdate: Some("1990-05-14".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = get_user(&db, "u1").await.unwrap().unwrap();
        assert_eq!(updated.name.as_deref(), Some("Айгерим"));
        assert_eq!(updated.birthdate.as_deref(), Some("1990-05-14"));
    }

    #[tokio::test]
    async fn empty_patch_is_a_noop() {
        let (db, _dir) = setup_db().await;
        insert_user(&db, &make_profile("u1")).await.unwrap();
        update_user(&db, "u1", &ProfilePatch::default()).await.unwrap();
        assert!(get_user(&db, "u1").await.unwrap().is_some());
    }
}
