// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily-survey CRUD operations.

use rusqlite::params;
use rusqlite::types::Value;

use migralog_core::MigralogError;

use crate::database::Database;
use crate::models::{SurveyPatch, SurveyRecord};

fn map_row(row: &rusqlite::Row<'_>) -> Result<SurveyRecord, rusqlite::Error> {
    Ok(SurveyRecord {
        survey_id: row.get(0)?,
        userid: row.get(1)?,
        headache_today: row.get(2)?,
        medicament_today: row.get(3)?,
        pain_intensity: row.get(4)?,
        pain_area: row.get(5)?,
        area_detail: row.get(6)?,
        pain_type: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// The most recently created survey row for an identity.
pub async fn latest_survey(
    db: &Database,
    userid: &str,
) -> Result<Option<SurveyRecord>, MigralogError> {
    let userid = userid.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT survey_id, userid, headache_today, medicament_today, pain_intensity,
                        pain_area, area_detail, pain_type, created_at
                 FROM surveys WHERE userid = ?1
                 ORDER BY created_at DESC, survey_id DESC LIMIT 1",
            )?;
            let result = stmt.query_row(params![userid], map_row);
            match result {
                Ok(survey) => Ok(Some(survey)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create a new survey row seeded with the patch's present fields.
///
/// Returns the new row id.
pub async fn insert_survey(
    db: &Database,
    userid: &str,
    patch: &SurveyPatch,
    created_at: &str,
) -> Result<i64, MigralogError> {
    let userid = userid.to_string();
    let created_at = created_at.to_string();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let mut columns = vec!["userid", "created_at"];
            let mut values = vec![Value::Text(userid), Value::Text(created_at)];
            collect_patch(&patch, &mut columns, &mut values);

            let placeholders = (1..=values.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "INSERT INTO surveys ({}) VALUES ({placeholders})",
                columns.join(", ")
            );
            conn.execute(&sql, rusqlite::params_from_iter(values))?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply a partial update to an existing survey row.
///
/// `created_at` is never modified: the freshness window is anchored to the
/// row's creation time.
pub async fn update_survey(
    db: &Database,
    survey_id: i64,
    userid: &str,
    patch: &SurveyPatch,
) -> Result<(), MigralogError> {
    if patch.is_empty() {
        return Ok(());
    }

    let userid = userid.to_string();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let mut columns = Vec::new();
            let mut values = Vec::new();
            collect_patch(&patch, &mut columns, &mut values);

            let sets = columns
                .iter()
                .map(|c| format!("{c} = ?"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql =
                format!("UPDATE surveys SET {sets} WHERE survey_id = ? AND userid = ?");
            values.push(Value::Integer(survey_id));
            values.push(Value::Text(userid));
            conn.execute(&sql, rusqlite::params_from_iter(values))?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Collects the present patch fields into parallel column/value lists.
fn collect_patch(patch: &SurveyPatch, columns: &mut Vec<&'static str>, values: &mut Vec<Value>) {
    if let Some(v) = &patch.headache_today {
        columns.push("headache_today");
        values.push(Value::Text(v.clone()));
    }
    if let Some(v) = &patch.medicament_today {
        columns.push("medicament_today");
        values.push(Value::Text(v.clone()));
    }
    if let Some(v) = patch.pain_intensity {
        columns.push("pain_intensity");
        values.push(Value::Integer(v));
    }
    if let Some(v) = &patch.pain_area {
        columns.push("pain_area");
        values.push(Value::Text(v.clone()));
    }
    if let Some(v) = &patch.area_detail {
        columns.push("area_detail");
        values.push(Value::Text(v.clone()));
    }
    if let Some(v) = &patch.pain_type {
        columns.push("pain_type");
        values.push(Value::Text(v.clone()));
    }
}
