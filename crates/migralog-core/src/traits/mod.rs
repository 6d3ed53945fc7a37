// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the Migralog orchestration core.
//!
//! These are the narrow seams the core calls through: the external
//! assistant, speech normalization, translation, and relational record
//! persistence. All use `#[async_trait]` for dynamic dispatch.

pub mod assistant;
pub mod records;
pub mod speech;
pub mod translate;

// Re-export all traits at the traits module level for convenience.
pub use assistant::AssistantAdapter;
pub use records::RecordStore;
pub use speech::{PassthroughTranscriber, Transcriber};
pub use translate::{IdentityTranslator, Translator};
