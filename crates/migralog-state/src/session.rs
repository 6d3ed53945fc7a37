// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed accessors over the dual-tier store for per-conversation session
//! state, plus the conversation reset.

use std::str::FromStr;
use std::sync::Arc;

use tracing::warn;

use migralog_core::types::TurnRecord;
use migralog_core::{AssistantRole, ConversationId, ConversationState, ThreadHandle};

use crate::keys;
use crate::store::DualTierStore;

/// Everything the state machine needs to decide how to treat an inbound
/// message. Absence of `state` means no active exchange.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub state: Option<ConversationState>,
    pub thread: Option<ThreadHandle>,
    pub role: Option<AssistantRole>,
}

/// Session-state facade over the [`DualTierStore`].
///
/// Within one conversation, callers are serialized by the thread request
/// serializer, so these operations need no additional locking.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<DualTierStore>,
}

impl SessionStore {
    pub fn new(store: Arc<DualTierStore>) -> Self {
        Self { store }
    }

    /// The underlying store, shared with the dedup guard.
    pub fn store(&self) -> Arc<DualTierStore> {
        Arc::clone(&self.store)
    }

    /// Loads the stored session snapshot for an identity.
    ///
    /// Unparseable stored values are treated as absent (and logged): a
    /// corrupt state key must not wedge the conversation forever.
    pub async fn load(&self, id: &ConversationId) -> SessionSnapshot {
        let state = match self.store.get(&keys::state_key(id)).await {
            Some(raw) => match ConversationState::from_str(&raw) {
                Ok(state) => Some(state),
                Err(_) => {
                    warn!(identity = %id, value = %raw, "unparseable conversation state, treating as absent");
                    None
                }
            },
            None => None,
        };

        let thread = self.store.get(&keys::thread_key(id)).await.map(ThreadHandle);

        let role = match self.store.get(&keys::role_key(id)).await {
            Some(raw) => match AssistantRole::from_str(&raw) {
                Ok(role) => Some(role),
                Err(_) => {
                    warn!(identity = %id, value = %raw, "unparseable assistant role, treating as absent");
                    None
                }
            },
            None => None,
        };

        SessionSnapshot { state, thread, role }
    }

    pub async fn set_state(&self, id: &ConversationId, state: ConversationState) {
        self.store
            .set(&keys::state_key(id), &state.to_string())
            .await;
    }

    pub async fn set_thread(&self, id: &ConversationId, thread: &ThreadHandle) {
        self.store.set(&keys::thread_key(id), &thread.0).await;
    }

    pub async fn set_role(&self, id: &ConversationId, role: AssistantRole) {
        self.store.set(&keys::role_key(id), &role.to_string()).await;
    }

    /// Appends a turn record to the identity's dialogue history.
    pub async fn append_turn(&self, id: &ConversationId, record: TurnRecord) {
        let key = keys::dialogue_history_key(id);
        let mut history = self.history(id).await;
        history.push(record);
        match serde_json::to_string(&history) {
            Ok(encoded) => self.store.set(&key, &encoded).await,
            Err(err) => warn!(identity = %id, error = %err, "failed to encode dialogue history"),
        }
    }

    /// The identity's dialogue history, oldest first.
    pub async fn history(&self, id: &ConversationId) -> Vec<TurnRecord> {
        let key = keys::dialogue_history_key(id);
        match self.store.get(&key).await {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(identity = %id, error = %err, "corrupt dialogue history, starting over");
                Vec::new()
            }),
            None => Vec::new(),
        }
    }

    /// The full conversation reset: clears state, thread handle, role,
    /// processed-message set, and dialogue history together. This is the
    /// only path back to "no session".
    pub async fn reset(&self, id: &ConversationId) {
        self.store.delete(&keys::state_key(id)).await;
        self.store.delete(&keys::thread_key(id)).await;
        self.store.delete(&keys::role_key(id)).await;
        self.store.delete(&keys::processed_key(id)).await;
        self.store.delete(&keys::dialogue_history_key(id)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (SessionStore, ConversationId) {
        let store = Arc::new(DualTierStore::new(None));
        (SessionStore::new(store), ConversationId("u1".into()))
    }

    #[tokio::test]
    async fn fresh_identity_has_empty_snapshot() {
        let (sessions, id) = session();
        let snapshot = sessions.load(&id).await;
        assert!(snapshot.state.is_none());
        assert!(snapshot.thread.is_none());
        assert!(snapshot.role.is_none());
    }

    #[tokio::test]
    async fn snapshot_round_trips() {
        let (sessions, id) = session();
        sessions
            .set_state(&id, ConversationState::AwaitingResponse)
            .await;
        sessions.set_thread(&id, &ThreadHandle("th-1".into())).await;
        sessions.set_role(&id, AssistantRole::Registration).await;

        let snapshot = sessions.load(&id).await;
        assert_eq!(snapshot.state, Some(ConversationState::AwaitingResponse));
        assert_eq!(snapshot.thread, Some(ThreadHandle("th-1".into())));
        assert_eq!(snapshot.role, Some(AssistantRole::Registration));
    }

    #[tokio::test]
    async fn corrupt_state_reads_as_absent() {
        let (sessions, id) = session();
        sessions.store().set(&keys::state_key(&id), "???").await;
        let snapshot = sessions.load(&id).await;
        assert!(snapshot.state.is_none());
    }

    #[tokio::test]
    async fn history_appends_in_order() {
        let (sessions, id) = session();
        for (role, content) in [("user", "Здравствуйте"), ("assistant", "Добрый день!")] {
            sessions
                .append_turn(
                    &id,
                    TurnRecord {
                        role: role.into(),
                        content: content.into(),
                        at: "2026-01-01T00:00:00Z".into(),
                    },
                )
                .await;
        }
        let history = sessions.history(&id).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].role, "assistant");
    }

    #[tokio::test]
    async fn reset_clears_everything_together() {
        let (sessions, id) = session();
        sessions
            .set_state(&id, ConversationState::ResponseReceived)
            .await;
        sessions.set_thread(&id, &ThreadHandle("th-1".into())).await;
        sessions.set_role(&id, AssistantRole::DailySurvey).await;
        sessions
            .store()
            .add_to_set(&keys::processed_key(&id), "m1")
            .await;
        sessions
            .append_turn(
                &id,
                TurnRecord {
                    role: "user".into(),
                    content: "x".into(),
                    at: "2026-01-01T00:00:00Z".into(),
                },
            )
            .await;

        sessions.reset(&id).await;

        let snapshot = sessions.load(&id).await;
        assert!(snapshot.state.is_none());
        assert!(snapshot.thread.is_none());
        assert!(snapshot.role.is_none());
        assert!(
            !sessions
                .store()
                .is_member(&keys::processed_key(&id), "m1")
                .await
        );
        assert!(sessions.history(&id).await.is_empty());
    }
}
