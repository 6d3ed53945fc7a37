// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Migralog workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque stable identifier for a user (e.g. a phone number).
///
/// Keys all per-user state. Never reused across users; immutable for the
/// lifetime of the account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for an inbound or stored message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier for an ongoing exchange with the external assistant.
///
/// One handle groups a sequence of turns with shared assistant-side context.
/// Created lazily on first contact, invalidated when the flow reaches a
/// terminal reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadHandle(pub String);

impl std::fmt::Display for ThreadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which assistant persona a conversation addresses.
///
/// Resolved once per conversation (no profile yet => Registration) and kept
/// alongside the thread handle for the life of the thread.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssistantRole {
    Registration,
    DailySurvey,
}

/// Liveness flag for an active exchange.
///
/// Absence of a stored state means no active exchange (first contact or a
/// cleared conversation). This guards re-entrancy; it is not a workflow state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// A request was sent and a reply is pending or was just produced.
    AwaitingResponse,
    /// The user's follow-up has been forwarded and a reply obtained.
    ResponseReceived,
}

/// The parsed result of an assistant turn, decoded once at the orchestration
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredReply {
    /// A plain answer.
    Text { text: String },
    /// A multiple-choice question needing option enrichment; `index` points
    /// into the fixed answer-option catalog for the active role.
    Question { text: String, index: u32 },
    /// A terminal reply carrying the embedded completion payload (profile or
    /// survey fields to persist).
    Completion {
        text: String,
        fields: serde_json::Map<String, serde_json::Value>,
    },
}

impl StructuredReply {
    /// The user-visible text of the reply, whatever the variant.
    pub fn text(&self) -> &str {
        match self {
            StructuredReply::Text { text }
            | StructuredReply::Question { text, .. }
            | StructuredReply::Completion { text, .. } => text,
        }
    }
}

/// One request/response exchange with the external assistant.
#[derive(Debug, Clone)]
pub struct AssistantTurn {
    /// Full reply text of the latest assistant message.
    pub text: String,
    /// Thread the turn ran on (newly created when none was supplied).
    pub thread: ThreadHandle,
    /// Raw turn record as returned by the assistant API, kept for the
    /// dialogue history.
    pub raw: serde_json::Value,
}

/// Inbound message payload as handed over by the transport layer.
#[derive(Debug, Clone)]
pub enum InboundContent {
    Text(String),
    /// Decoded audio bytes; transcription is delegated to the speech
    /// collaborator.
    Audio(Vec<u8>),
}

/// Outcome status of handling one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HandleStatus {
    Success,
    Duplicate,
    Error,
}

/// Error classification surfaced to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transcription,
    Assistant,
    UnknownQuestion,
    Internal,
}

/// Reply payload returned to the transport on success (and on user-facing
/// errors that still carry text, such as a request to repeat).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyPayload {
    /// Persisted message id of the assistant reply, when it was stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub text: String,
    /// Fixed answer options for a question reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_custom_option_allowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Result of `handle_inbound_message`, idempotent per (identity, message id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleOutcome {
    pub status: HandleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl HandleOutcome {
    pub fn success(reply: ReplyPayload) -> Self {
        Self {
            status: HandleStatus::Success,
            reply: Some(reply),
            error_kind: None,
        }
    }

    pub fn duplicate() -> Self {
        Self {
            status: HandleStatus::Duplicate,
            reply: None,
            error_kind: None,
        }
    }

    pub fn error(kind: ErrorKind, reply: Option<ReplyPayload>) -> Self {
        Self {
            status: HandleStatus::Error,
            reply,
            error_kind: Some(kind),
        }
    }
}

/// One entry of the per-conversation dialogue history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
    pub at: String,
}

// --- Domain records ---

/// A registered user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub userid: String,
    pub language: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    /// ISO date (`%Y-%m-%d`).
    pub birthdate: Option<String>,
    /// `%H:%M` local time for the daily reminder.
    pub reminder_time: Option<String>,
    pub created_at: String,
}

/// A persisted chat message (from the user or the assistant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub userid: String,
    pub content: String,
    pub is_from_user: bool,
    pub created_at: String,
}

/// One daily-survey row.
///
/// A row is "current" only within the freshness window from `created_at`;
/// outside the window a new row is created instead of mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub survey_id: i64,
    pub userid: String,
    pub headache_today: Option<String>,
    pub medicament_today: Option<String>,
    pub pain_intensity: Option<i64>,
    pub pain_area: Option<String>,
    pub area_detail: Option<String>,
    pub pain_type: Option<String>,
    pub created_at: String,
}

/// Partial update for a user profile. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub reminder_time: Option<String>,
    pub language: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.gender.is_none()
            && self.birthdate.is_none()
            && self.reminder_time.is_none()
            && self.language.is_none()
    }
}

/// Partial update for a survey row. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyPatch {
    pub headache_today: Option<String>,
    pub medicament_today: Option<String>,
    pub pain_intensity: Option<i64>,
    pub pain_area: Option<String>,
    pub area_detail: Option<String>,
    pub pain_type: Option<String>,
}

impl SurveyPatch {
    pub fn is_empty(&self) -> bool {
        self.headache_today.is_none()
            && self.medicament_today.is_none()
            && self.pain_intensity.is_none()
            && self.pain_area.is_none()
            && self.area_detail.is_none()
            && self.pain_type.is_none()
    }
}
