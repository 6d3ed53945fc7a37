// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Speech/text normalization trait for inbound message content.

use async_trait::async_trait;

use crate::error::MigralogError;
use crate::types::InboundContent;

/// Normalizes inbound content into plain text.
///
/// Returns `Ok(None)` when no usable text could be produced (unrecognized
/// audio); the orchestrator surfaces that as a request to repeat.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        content: &InboundContent,
        language: &str,
    ) -> Result<Option<String>, MigralogError>;
}

/// Text-only transcriber: passes text through and rejects audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranscriber;

#[async_trait]
impl Transcriber for PassthroughTranscriber {
    async fn transcribe(
        &self,
        content: &InboundContent,
        _language: &str,
    ) -> Result<Option<String>, MigralogError> {
        match content {
            InboundContent::Text(text) => Ok(Some(text.clone())),
            InboundContent::Audio(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passthrough_returns_text_verbatim() {
        let t = PassthroughTranscriber;
        let out = t
            .transcribe(&InboundContent::Text("привет".into()), "ru")
            .await
            .unwrap();
        assert_eq!(out.as_deref(), Some("привет"));
    }

    #[tokio::test]
    async fn passthrough_rejects_audio() {
        let t = PassthroughTranscriber;
        let out = t
            .transcribe(&InboundContent::Audio(vec![0, 1, 2]), "ru")
            .await
            .unwrap();
        assert!(out.is_none());
    }
}
