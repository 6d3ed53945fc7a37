// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message dedup guard.
//!
//! The transport may redeliver; this guard provides idempotent *effect*, not
//! idempotent delivery. A message without an identifier is never considered
//! processed (it fails open so it is still handled) and cannot be marked.

use std::sync::Arc;

use tracing::{debug, warn};

use migralog_core::{ConversationId, MessageId};

use crate::keys;
use crate::store::DualTierStore;

/// Answers "already handled?" and records handling, per conversation.
#[derive(Clone)]
pub struct DedupGuard {
    store: Arc<DualTierStore>,
}

impl DedupGuard {
    pub fn new(store: Arc<DualTierStore>) -> Self {
        Self { store }
    }

    /// True iff this message id was already handled for this conversation.
    pub async fn is_processed(
        &self,
        conversation: &ConversationId,
        message_id: Option<&MessageId>,
    ) -> bool {
        let Some(message_id) = message_id else {
            return false;
        };
        self.store
            .is_member(&keys::processed_key(conversation), &message_id.0)
            .await
    }

    /// Records a message id as handled. A missing id cannot be marked; the
    /// caller must treat such a message as always-deliver.
    pub async fn mark_processed(
        &self,
        conversation: &ConversationId,
        message_id: Option<&MessageId>,
    ) {
        let Some(message_id) = message_id else {
            warn!(identity = %conversation, "message without id cannot be marked processed");
            return;
        };
        self.store
            .add_to_set(&keys::processed_key(conversation), &message_id.0)
            .await;
        debug!(identity = %conversation, message_id = %message_id, "marked message processed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> (DedupGuard, ConversationId) {
        let store = Arc::new(DualTierStore::new(None));
        (DedupGuard::new(store), ConversationId("u1".into()))
    }

    #[tokio::test]
    async fn mark_then_check() {
        let (guard, id) = guard();
        let m1 = MessageId("m1".into());

        assert!(!guard.is_processed(&id, Some(&m1)).await);
        guard.mark_processed(&id, Some(&m1)).await;
        assert!(guard.is_processed(&id, Some(&m1)).await);
        assert!(!guard.is_processed(&id, Some(&MessageId("m2".into()))).await);
    }

    #[tokio::test]
    async fn missing_id_fails_open() {
        let (guard, id) = guard();

        assert!(!guard.is_processed(&id, None).await);
        // Marking without an id is a no-op, not a panic.
        guard.mark_processed(&id, None).await;
        assert!(!guard.is_processed(&id, None).await);
    }

    #[tokio::test]
    async fn conversations_do_not_share_processed_sets() {
        let (guard, id) = guard();
        let other = ConversationId("u2".into());
        let m1 = MessageId("m1".into());

        guard.mark_processed(&id, Some(&m1)).await;
        assert!(!guard.is_processed(&other, Some(&m1)).await);
    }
}
