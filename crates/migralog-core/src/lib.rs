// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Migralog conversation backend.
//!
//! This crate provides the foundational trait definitions, error type, and
//! common types used throughout the Migralog workspace. Collaborator
//! implementations (assistant client, SQLite records) live in their own
//! crates and implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MigralogError;
pub use types::{
    AssistantRole, AssistantTurn, ConversationId, ConversationState, ErrorKind,
    HandleOutcome, HandleStatus, InboundContent, MessageId, ReplyPayload,
    StructuredReply, ThreadHandle,
};

pub use traits::{
    AssistantAdapter, IdentityTranslator, PassthroughTranscriber, RecordStore,
    Transcriber, Translator,
};
