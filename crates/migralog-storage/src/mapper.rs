// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps a parsed completion payload into persisted domain records.
//!
//! Registration payloads create or update the user profile; daily-survey
//! payloads create or update a survey row under the freshness-window policy:
//! the newest row is mutated only while it is younger than one hour,
//! otherwise a new row is created ("one survey session per time window").
//!
//! Field coercion failures drop that single field (logged) rather than
//! aborting the whole update.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::{debug, warn};

use migralog_core::types::{ProfilePatch, SurveyPatch, UserProfile};
use migralog_core::{AssistantRole, ConversationId, MigralogError, RecordStore};

/// Freshness window for survey rows, in seconds.
pub const FRESHNESS_WINDOW_SECS: i64 = 3600;

/// Applies completion payloads to the record store.
#[derive(Clone)]
pub struct DataMapper {
    records: Arc<dyn RecordStore>,
}

impl DataMapper {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Persists the extracted fields for an identity under the given role.
    pub async fn apply(
        &self,
        role: AssistantRole,
        identity: &ConversationId,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), MigralogError> {
        match role {
            AssistantRole::Registration => self.apply_registration(identity, fields).await,
            AssistantRole::DailySurvey => self.apply_survey(identity, fields).await,
        }
    }

    async fn apply_registration(
        &self,
        identity: &ConversationId,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), MigralogError> {
        let patch = ProfilePatch {
            name: string_field(fields, "name"),
            gender: string_field(fields, "gender"),
            birthdate: string_field(fields, "birthdate")
                .and_then(|raw| coerce_or_skip(identity, "birthdate", &raw, coerce_birthdate)),
            reminder_time: string_field(fields, "reminder_time").and_then(|raw| {
                coerce_or_skip(identity, "reminder_time", &raw, coerce_reminder_time)
            }),
            language: string_field(fields, "language"),
        };

        match self.records.get_user(identity).await? {
            Some(_) => {
                self.records.update_user(identity, &patch).await?;
                debug!(identity = %identity, "registration fields updated");
            }
            None => {
                let now = Utc::now().to_rfc3339();
                self.records
                    .insert_user(&UserProfile {
                        userid: identity.0.clone(),
                        language: patch.language.clone().unwrap_or_else(|| "ru".into()),
                        name: patch.name.clone(),
                        gender: patch.gender.clone(),
                        birthdate: patch.birthdate.clone(),
                        reminder_time: patch.reminder_time.clone(),
                        created_at: now,
                    })
                    .await?;
                debug!(identity = %identity, "new profile registered");
            }
        }
        Ok(())
    }

    async fn apply_survey(
        &self,
        identity: &ConversationId,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), MigralogError> {
        let patch = SurveyPatch {
            headache_today: string_field(fields, "headache_today"),
            medicament_today: string_field(fields, "medicament_today"),
            pain_intensity: fields
                .get("pain_intensity")
                .and_then(|v| match coerce_pain_intensity(v) {
                    Some(intensity) => Some(intensity),
                    None => {
                        warn!(identity = %identity, value = %v, "dropping uncoercible pain_intensity");
                        None
                    }
                }),
            pain_area: string_field(fields, "pain_area"),
            area_detail: string_field(fields, "area_detail"),
            pain_type: string_field(fields, "pain_type"),
        };

        if patch.is_empty() {
            debug!(identity = %identity, "survey payload had no usable fields");
            return Ok(());
        }

        let latest = self.records.latest_survey(identity).await?;
        match latest {
            Some(survey) if is_fresh(&survey.created_at) => {
                self.records
                    .update_survey(survey.survey_id, identity, &patch)
                    .await?;
                debug!(
                    identity = %identity,
                    survey_id = survey.survey_id,
                    "survey updated within freshness window"
                );
            }
            _ => {
                let survey_id = self.records.insert_survey(identity, &patch).await?;
                debug!(identity = %identity, survey_id, "new survey row created");
            }
        }
        Ok(())
    }
}

/// True iff the row was created within the freshness window. An unparseable
/// timestamp counts as stale, so a fresh row is created instead.
fn is_fresh(created_at: &str) -> bool {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(created) => {
            let age = Utc::now().signed_duration_since(created.with_timezone(&Utc));
            age.num_seconds() < FRESHNESS_WINDOW_SECS
        }
        Err(_) => false,
    }
}

/// Non-empty trimmed string value of a payload field.
fn string_field(
    fields: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<String> {
    fields
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn coerce_or_skip(
    identity: &ConversationId,
    field: &str,
    raw: &str,
    coerce: fn(&str) -> Option<String>,
) -> Option<String> {
    match coerce(raw) {
        Some(v) => Some(v),
        None => {
            warn!(identity = %identity, field, value = raw, "dropping uncoercible field");
            None
        }
    }
}

/// Accepts `DD.MM.YYYY` (the assistant's format) or ISO `YYYY-MM-DD`;
/// canonicalizes to ISO.
fn coerce_birthdate(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Accepts `HH:MM` or `HH:MM:SS`; canonicalizes to `HH:MM`.
fn coerce_reminder_time(raw: &str) -> Option<String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
        .map(|t| t.format("%H:%M").to_string())
}

/// Accepts an integer or a numeric string on the 0..=10 pain scale.
fn coerce_pain_intensity(value: &serde_json::Value) -> Option<i64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (0..=10).contains(&n).then_some(n)
}
