// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage tier contract for conversation state.
//!
//! A tier is a plain key/value + set store. The remote tier (Redis) and the
//! in-process fallback tier both implement this trait; the dual-tier store
//! composes them and owns the degradation policy.

use async_trait::async_trait;

use migralog_core::MigralogError;

/// One storage tier of the conversation state store.
#[async_trait]
pub trait StateTier: Send + Sync {
    /// Fetches a plain value. `Ok(None)` means the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, MigralogError>;

    /// Stores a plain value.
    async fn set(&self, key: &str, value: &str) -> Result<(), MigralogError>;

    /// Removes a key (value or set).
    async fn delete(&self, key: &str) -> Result<(), MigralogError>;

    /// Adds a member to the set stored at `key`, creating the set if needed.
    async fn sadd(&self, key: &str, member: &str) -> Result<(), MigralogError>;

    /// Tests set membership.
    async fn sismember(&self, key: &str, member: &str) -> Result<bool, MigralogError>;

    /// All members of the set stored at `key`.
    async fn smembers(&self, key: &str) -> Result<Vec<String>, MigralogError>;
}
