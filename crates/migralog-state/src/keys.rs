// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logical key layout of the conversation state store, tier-agnostic.

use migralog_core::ConversationId;

/// `state:{identity}` — the conversation liveness flag.
pub fn state_key(id: &ConversationId) -> String {
    format!("state:{id}")
}

/// `thread:{identity}` — the active assistant thread handle.
pub fn thread_key(id: &ConversationId) -> String {
    format!("thread:{id}")
}

/// `role:{identity}` — the assistant role chosen for the active thread.
pub fn role_key(id: &ConversationId) -> String {
    format!("role:{id}")
}

/// `processed:{identity}` — set of message ids already handled.
pub fn processed_key(id: &ConversationId) -> String {
    format!("processed:{id}")
}

/// `dialogue_history:{identity}` — JSON array of turn records.
pub fn dialogue_history_key(id: &ConversationId) -> String {
    format!("dialogue_history:{id}")
}

/// Extracts the identity part of any state-store key.
pub fn identity_of(key: &str) -> Option<ConversationId> {
    key.split_once(':')
        .map(|(_, id)| ConversationId(id.to_string()))
}
