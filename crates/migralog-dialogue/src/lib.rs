// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for the Migralog backend.
//!
//! Contains the per-thread request serializer, the structured-reply decoder,
//! the fixed answer-option catalog, and the [`Orchestrator`] state machine
//! that ties them to the state store, the assistant, and the record store.

pub mod catalog;
pub mod orchestrator;
pub mod reply;
pub mod serializer;

pub use catalog::{AnswerOptions, lookup};
pub use orchestrator::{GREETING, Orchestrator};
pub use reply::parse_reply;
pub use serializer::ThreadSerializer;
