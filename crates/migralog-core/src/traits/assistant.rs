// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant adapter trait for the external language-model collaborator.

use async_trait::async_trait;

use crate::error::MigralogError;
use crate::types::{AssistantRole, AssistantTurn, ThreadHandle};

/// Adapter for the external assistant integration.
///
/// One thread handle groups a sequence of turns with shared assistant-side
/// context. Concurrent turns against the same thread are not safe; the
/// dialogue layer serializes them.
#[async_trait]
pub trait AssistantAdapter: Send + Sync {
    /// Creates a fresh conversation thread.
    async fn create_thread(&self) -> Result<ThreadHandle, MigralogError>;

    /// Runs one turn: posts `content` to the thread (creating one when
    /// `thread` is absent) and returns the assistant's reply.
    async fn converse(
        &self,
        content: &str,
        thread: Option<&ThreadHandle>,
        role: AssistantRole,
    ) -> Result<AssistantTurn, MigralogError>;
}
