// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait for relational persistence of final domain records
//! (user profiles, chat messages, survey rows). Separate from the key/value
//! conversation state store.

use async_trait::async_trait;

use crate::error::MigralogError;
use crate::types::{
    ChatMessage, ConversationId, ProfilePatch, SurveyPatch, SurveyRecord, UserProfile,
};

/// Relational persistence of final domain records.
///
/// Patch arguments carry only the fields to change; absent fields are left
/// untouched (an existing value is never nulled out by an absent one).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetches the profile for an identity, if one was ever registered.
    async fn get_user(
        &self,
        userid: &ConversationId,
    ) -> Result<Option<UserProfile>, MigralogError>;

    /// Inserts a new profile row.
    async fn insert_user(&self, profile: &UserProfile) -> Result<(), MigralogError>;

    /// Applies a partial profile update.
    async fn update_user(
        &self,
        userid: &ConversationId,
        patch: &ProfilePatch,
    ) -> Result<(), MigralogError>;

    /// Persists a chat message and returns it with storage timestamps filled in.
    async fn insert_message(
        &self,
        message: &ChatMessage,
    ) -> Result<ChatMessage, MigralogError>;

    /// Messages for an identity in chronological order.
    async fn messages_for_user(
        &self,
        userid: &ConversationId,
        limit: Option<i64>,
    ) -> Result<Vec<ChatMessage>, MigralogError>;

    /// The most recently created survey row for an identity.
    async fn latest_survey(
        &self,
        userid: &ConversationId,
    ) -> Result<Option<SurveyRecord>, MigralogError>;

    /// Creates a new survey row seeded with the present fields; returns its id.
    async fn insert_survey(
        &self,
        userid: &ConversationId,
        patch: &SurveyPatch,
    ) -> Result<i64, MigralogError>;

    /// Applies a partial update to an existing survey row. `created_at` is
    /// never modified.
    async fn update_survey(
        &self,
        survey_id: i64,
        userid: &ConversationId,
        patch: &SurveyPatch,
    ) -> Result<(), MigralogError>;
}
