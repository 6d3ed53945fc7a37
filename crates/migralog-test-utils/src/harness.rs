// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end test harness: an [`Orchestrator`] wired to a mock assistant,
//! a flaky remote tier over the dual-tier store, and a temp-file SQLite
//! record store.

use std::sync::Arc;

use tempfile::TempDir;

use migralog_config::model::StorageConfig;
use migralog_core::{
    AssistantAdapter, ConversationId, IdentityTranslator, InboundContent, MessageId,
    PassthroughTranscriber, RecordStore,
};
use migralog_dialogue::Orchestrator;
use migralog_state::{DualTierStore, SessionStore, StateTier};
use migralog_storage::SqliteRecords;

use crate::flaky_tier::FlakyTier;
use crate::mock_assistant::MockAssistant;

/// A fully wired backend over mock collaborators.
pub struct TestBackend {
    pub orchestrator: Orchestrator,
    pub assistant: Arc<MockAssistant>,
    pub remote: Arc<FlakyTier>,
    pub store: Arc<DualTierStore>,
    pub records: Arc<SqliteRecords>,
    pub db_path: String,
    _dir: TempDir,
}

impl TestBackend {
    /// Builds a backend with a fresh temp database and an empty state store.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir
            .path()
            .join("migralog.db")
            .to_str()
            .expect("utf-8 path")
            .to_string();

        let records = Arc::new(SqliteRecords::new(StorageConfig {
            database_path: db_path.clone(),
            wal_mode: true,
        }));
        records.initialize().await.expect("storage init");

        let assistant = Arc::new(MockAssistant::new());
        let remote = Arc::new(FlakyTier::new());
        let store = Arc::new(DualTierStore::new(Some(
            Arc::clone(&remote) as Arc<dyn StateTier>
        )));

        let orchestrator = Orchestrator::new(
            Arc::clone(&store),
            Arc::clone(&assistant) as Arc<dyn AssistantAdapter>,
            Arc::new(PassthroughTranscriber),
            Arc::new(IdentityTranslator),
            Arc::clone(&records) as Arc<dyn RecordStore>,
            "ru".to_string(),
        );

        Self {
            orchestrator,
            assistant,
            remote,
            store,
            records,
            db_path,
            _dir: dir,
        }
    }

    /// A session-store view over the same dual-tier store, for assertions.
    pub fn sessions(&self) -> SessionStore {
        SessionStore::new(Arc::clone(&self.store))
    }
}

/// Shorthand for a text inbound payload.
pub fn text(content: &str) -> InboundContent {
    InboundContent::Text(content.to_string())
}

/// Shorthand for a message id.
pub fn mid(id: &str) -> MessageId {
    MessageId(id.to_string())
}

/// Shorthand for a conversation identity.
pub fn identity(id: &str) -> ConversationId {
    ConversationId(id.to_string())
}
