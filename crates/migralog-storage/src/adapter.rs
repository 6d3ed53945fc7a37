// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the RecordStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use migralog_config::model::StorageConfig;
use migralog_core::types::{
    ChatMessage, ConversationId, ProfilePatch, SurveyPatch, SurveyRecord, UserProfile,
};
use migralog_core::{MigralogError, RecordStore};

use crate::database::Database;
use crate::queries;

/// SQLite-backed record store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`SqliteRecords::initialize`].
pub struct SqliteRecords {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteRecords {
    /// Create a new SqliteRecords with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Opens the database at the configured path and runs migrations.
    pub async fn initialize(&self) -> Result<(), MigralogError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| MigralogError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite record store initialized");
        Ok(())
    }

    /// Checkpoints and flushes pending writes.
    pub async fn close(&self) -> Result<(), MigralogError> {
        self.db()?.close().await
    }

    fn db(&self) -> Result<&Database, MigralogError> {
        self.db.get().ok_or_else(|| MigralogError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl RecordStore for SqliteRecords {
    async fn get_user(
        &self,
        userid: &ConversationId,
    ) -> Result<Option<UserProfile>, MigralogError> {
        queries::users::get_user(self.db()?, &userid.0).await
    }

    async fn insert_user(&self, profile: &UserProfile) -> Result<(), MigralogError> {
        queries::users::insert_user(self.db()?, profile).await
    }

    async fn update_user(
        &self,
        userid: &ConversationId,
        patch: &ProfilePatch,
    ) -> Result<(), MigralogError> {
        queries::users::update_user(self.db()?, &userid.0, patch).await
    }

    async fn insert_message(
        &self,
        message: &ChatMessage,
    ) -> Result<ChatMessage, MigralogError> {
        let mut message = message.clone();
        if message.id.is_empty() {
            message.id = uuid::Uuid::new_v4().to_string();
        }
        if message.created_at.is_empty() {
            message.created_at = chrono::Utc::now().to_rfc3339();
        }
        queries::messages::insert_message(self.db()?, &message).await?;
        Ok(message)
    }

    async fn messages_for_user(
        &self,
        userid: &ConversationId,
        limit: Option<i64>,
    ) -> Result<Vec<ChatMessage>, MigralogError> {
        queries::messages::messages_for_user(self.db()?, &userid.0, limit).await
    }

    async fn latest_survey(
        &self,
        userid: &ConversationId,
    ) -> Result<Option<SurveyRecord>, MigralogError> {
        queries::surveys::latest_survey(self.db()?, &userid.0).await
    }

    async fn insert_survey(
        &self,
        userid: &ConversationId,
        patch: &SurveyPatch,
    ) -> Result<i64, MigralogError> {
        let now = chrono::Utc::now().to_rfc3339();
        queries::surveys::insert_survey(self.db()?, &userid.0, patch, &now).await
    }

    async fn update_survey(
        &self,
        survey_id: i64,
        userid: &ConversationId,
        patch: &SurveyPatch,
    ) -> Result<(), MigralogError> {
        queries::surveys::update_survey(self.db()?, survey_id, &userid.0, patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    async fn setup() -> (SqliteRecords, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("records.db");
        let records = SqliteRecords::new(make_config(db_path.to_str().unwrap()));
        records.initialize().await.unwrap();
        (records, dir)
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let (records, _dir) = setup().await;
        assert!(records.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("uninit.db");
        let records = SqliteRecords::new(make_config(db_path.to_str().unwrap()));
        let result = records.get_user(&ConversationId("u1".into())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn full_record_lifecycle() {
        let (records, _dir) = setup().await;
        let id = ConversationId("u1".into());

        // No profile yet.
        assert!(records.get_user(&id).await.unwrap().is_none());

        // Register a skeleton profile.
        records
            .insert_user(&UserProfile {
                userid: "u1".into(),
                language: "ru".into(),
                name: None,
                gender: None,
                birthdate: None,
                reminder_time: None,
                created_at: chrono::Utc::now().to_rfc3339(),
            })
            .await
            .unwrap();

        // Fill in registration fields.
        records
            .update_user(
                &id,
                &ProfilePatch {
                    name: Some("Айгерим".into()),
                    reminder_time: Some("09:30".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let profile = records.get_user(&id).await.unwrap().unwrap();
        assert_eq!(profile.name.as_deref(), Some("Айгерим"));
        assert_eq!(profile.reminder_time.as_deref(), Some("09:30"));

        // Persist a message; id and timestamp are filled in.
        let stored = records
            .insert_message(&ChatMessage {
                id: String::new(),
                userid: "u1".into(),
                content: "Добрый день!".into(),
                is_from_user: false,
                created_at: String::new(),
            })
            .await
            .unwrap();
        assert!(!stored.id.is_empty());
        assert!(!stored.created_at.is_empty());
        assert_eq!(records.messages_for_user(&id, None).await.unwrap().len(), 1);

        // Survey create + partial update.
        let survey_id = records
            .insert_survey(
                &id,
                &SurveyPatch {
                    headache_today: Some("Да".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        records
            .update_survey(
                survey_id,
                &id,
                &SurveyPatch {
                    pain_intensity: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let survey = records.latest_survey(&id).await.unwrap().unwrap();
        assert_eq!(survey.survey_id, survey_id);
        assert_eq!(survey.headache_today.as_deref(), Some("Да"));
        assert_eq!(survey.pain_intensity, Some(7));

        records.close().await.unwrap();
    }
}
