// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation trait, used when the conversation language differs from the
//! assistant's native language.

use async_trait::async_trait;

use crate::error::MigralogError;

/// Machine-translation collaborator.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<String, MigralogError>;
}

/// No-op translator for single-language deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(
        &self,
        text: &str,
        _from: &str,
        _to: &str,
    ) -> Result<String, MigralogError> {
        Ok(text.to_string())
    }
}
