// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Migralog conversation backend.

use thiserror::Error;

use crate::types::AssistantRole;

/// The primary error type used across all Migralog components.
#[derive(Debug, Error)]
pub enum MigralogError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Relational storage errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// State-store tier errors. Absorbed by the dual-tier store; callers of
    /// the store never see this variant.
    #[error("state store error: {message}")]
    StateStore {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// External assistant errors (API failure, run did not complete, empty reply).
    #[error("assistant error: {message}")]
    Assistant {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The speech collaborator produced no usable text for an inbound message.
    #[error("transcription produced no text")]
    Transcription,

    /// Machine-translation collaborator failure.
    #[error("translation error: {message}")]
    Translation { message: String },

    /// A structured reply referenced a question index absent from the
    /// answer-option catalog.
    #[error("question {index} not found for {role} assistant")]
    UnknownQuestion { role: AssistantRole, index: u32 },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
