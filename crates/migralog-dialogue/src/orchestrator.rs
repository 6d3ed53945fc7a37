// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation state machine.
//!
//! One inbound message flows: dedup check -> transcription/translation ->
//! role + thread resolution -> serialized assistant turn -> structured reply
//! decoding (with option enrichment) -> record persistence -> dedup mark ->
//! conversation reset on a terminal reply.
//!
//! All collaborator faults are caught here and converted to a structured
//! [`HandleOutcome`]; nothing escapes as an unhandled error, and one
//! conversation's failure never affects others.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use migralog_core::types::{ChatMessage, ReplyPayload, TurnRecord, UserProfile};
use migralog_core::{
    AssistantAdapter, AssistantRole, AssistantTurn, ConversationId, ConversationState,
    ErrorKind, HandleOutcome, InboundContent, MessageId, MigralogError, RecordStore,
    StructuredReply, Transcriber, Translator,
};
use migralog_state::{DedupGuard, DualTierStore, SessionStore};
use migralog_storage::DataMapper;

use crate::catalog;
use crate::reply;
use crate::serializer::ThreadSerializer;

/// Fixed opening turn for a new conversation.
pub const GREETING: &str = "Здравствуйте";

/// User-facing request to repeat after a failed transcription.
const REPEAT_REQUEST: &str =
    "К сожалению, я не смог распознать ваш голос. Пожалуйста, повторите свой запрос.";

/// User-facing text for an unknown question index.
const QUESTION_NOT_FOUND: &str = "Вопрос не найден. Пожалуйста, повторите свой ответ.";

/// Routes inbound messages through the registration-vs-survey dialogue.
pub struct Orchestrator {
    sessions: SessionStore,
    dedup: DedupGuard,
    serializer: ThreadSerializer,
    assistant: Arc<dyn AssistantAdapter>,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    records: Arc<dyn RecordStore>,
    mapper: DataMapper,
    native_language: String,
}

impl Orchestrator {
    pub fn new(
        store: Arc<DualTierStore>,
        assistant: Arc<dyn AssistantAdapter>,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        records: Arc<dyn RecordStore>,
        native_language: String,
    ) -> Self {
        Self {
            sessions: SessionStore::new(Arc::clone(&store)),
            dedup: DedupGuard::new(store),
            serializer: ThreadSerializer::new(),
            assistant,
            transcriber,
            translator,
            mapper: DataMapper::new(Arc::clone(&records)),
            records,
            native_language,
        }
    }

    /// Handles one inbound message. Idempotent per `(identity, message_id)`,
    /// safe to call concurrently for different identities, and internally
    /// serialized per active thread.
    pub async fn handle_inbound_message(
        &self,
        identity: &ConversationId,
        message_id: Option<MessageId>,
        content: InboundContent,
        language: &str,
    ) -> HandleOutcome {
        match self
            .process(identity, message_id.as_ref(), &content, language)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => self.outcome_for_error(identity, err).await,
        }
    }

    async fn process(
        &self,
        identity: &ConversationId,
        message_id: Option<&MessageId>,
        content: &InboundContent,
        language: &str,
    ) -> Result<HandleOutcome, MigralogError> {
        if self.dedup.is_processed(identity, message_id).await {
            info!(identity = %identity, "message already processed, skipping");
            return Ok(HandleOutcome::duplicate());
        }

        let text = self
            .transcriber
            .transcribe(content, language)
            .await?
            .ok_or(MigralogError::Transcription)?;

        // The assistant personas speak the native language only.
        let text = if language != self.native_language {
            match self
                .translator
                .translate(&text, language, &self.native_language)
                .await
            {
                Ok(translated) => translated,
                Err(err) => {
                    error!(identity = %identity, error = %err, "inbound translation failed");
                    return Err(MigralogError::Transcription);
                }
            }
        } else {
            text
        };

        let snapshot = self.sessions.load(identity).await;
        let first_contact = snapshot.state.is_none();

        let (role, turn) = if first_contact {
            let role = self.resolve_role(identity, language).await?;
            let thread = self.assistant.create_thread().await?;
            self.sessions.set_thread(identity, &thread).await;
            self.sessions.set_role(identity, role).await;
            debug!(identity = %identity, thread = %thread, role = %role, "starting conversation");

            let turn = self
                .serializer
                .run(&thread, self.assistant.converse(GREETING, Some(&thread), role))
                .await?;
            (role, turn)
        } else {
            let role = match snapshot.role {
                Some(role) => role,
                None => self.resolve_role(identity, language).await?,
            };
            let turn = match &snapshot.thread {
                Some(thread) => {
                    self.serializer
                        .run(thread, self.assistant.converse(&text, Some(thread), role))
                        .await?
                }
                None => {
                    warn!(identity = %identity, "stored thread handle missing, assistant will create one");
                    self.assistant.converse(&text, None, role).await?
                }
            };
            self.sessions.set_role(identity, role).await;
            (role, turn)
        };

        // Retain the handle the turn actually ran on.
        self.sessions.set_thread(identity, &turn.thread).await;
        let next_state = if first_contact {
            ConversationState::AwaitingResponse
        } else {
            ConversationState::ResponseReceived
        };
        self.sessions.set_state(identity, next_state).await;

        let outcome = self
            .finish_turn(identity, message_id, language, role, &text, &turn)
            .await?;
        Ok(outcome)
    }

    /// Decodes the reply, enriches question options, persists records, marks
    /// the message processed, and resets the conversation on a terminal
    /// reply.
    async fn finish_turn(
        &self,
        identity: &ConversationId,
        message_id: Option<&MessageId>,
        language: &str,
        role: AssistantRole,
        user_text: &str,
        turn: &AssistantTurn,
    ) -> Result<HandleOutcome, MigralogError> {
        let mut options = None;
        let mut custom_allowed = None;

        let (display_text, completion) = match reply::parse_reply(&turn.text) {
            StructuredReply::Text { text } => (text, None),
            StructuredReply::Question { text, index } => {
                // An unknown index leaves the conversation state exactly as
                // the turn set it, so a retry re-enters from the same point.
                let answers = catalog::lookup(role, index)?;
                options = Some(
                    answers
                        .options
                        .iter()
                        .map(|option| option.to_string())
                        .collect::<Vec<_>>(),
                );
                custom_allowed = Some(answers.is_custom_option_allowed);
                (text, None)
            }
            StructuredReply::Completion { text, fields } => (text, Some(fields)),
        };

        let display_text = if language != self.native_language {
            match self
                .translator
                .translate(&display_text, &self.native_language, language)
                .await
            {
                Ok(translated) => translated,
                Err(err) => {
                    warn!(identity = %identity, error = %err, "reply translation failed, sending untranslated");
                    display_text
                }
            }
        } else {
            display_text
        };

        let stored = self.persist_reply(identity, &display_text).await;

        let now = chrono::Utc::now().to_rfc3339();
        self.sessions
            .append_turn(
                identity,
                TurnRecord {
                    role: "user".into(),
                    content: user_text.to_string(),
                    at: now.clone(),
                },
            )
            .await;
        self.sessions
            .append_turn(
                identity,
                TurnRecord {
                    role: "assistant".into(),
                    content: display_text.clone(),
                    at: now,
                },
            )
            .await;

        self.dedup.mark_processed(identity, message_id).await;

        if let Some(fields) = completion {
            self.mapper.apply(role, identity, &fields).await?;
            self.sessions.reset(identity).await;
            self.serializer.forget(&turn.thread);
            info!(identity = %identity, role = %role, "terminal reply reached, conversation cleared");
        }

        Ok(HandleOutcome::success(ReplyPayload {
            message_id: stored.as_ref().map(|msg| msg.id.clone()),
            text: display_text,
            options,
            is_custom_option_allowed: custom_allowed,
            created_at: stored.map(|msg| msg.created_at),
        }))
    }

    /// Resolves which assistant persona a fresh conversation addresses:
    /// no profile yet means registration (and registers the skeleton row),
    /// an existing profile means the daily survey.
    async fn resolve_role(
        &self,
        identity: &ConversationId,
        language: &str,
    ) -> Result<AssistantRole, MigralogError> {
        match self.records.get_user(identity).await? {
            Some(_) => Ok(AssistantRole::DailySurvey),
            None => {
                self.records
                    .insert_user(&UserProfile {
                        userid: identity.0.clone(),
                        language: language.to_string(),
                        name: None,
                        gender: None,
                        birthdate: None,
                        reminder_time: None,
                        created_at: chrono::Utc::now().to_rfc3339(),
                    })
                    .await?;
                info!(identity = %identity, "new user registered");
                Ok(AssistantRole::Registration)
            }
        }
    }

    /// Persists the assistant reply as a chat message. Best-effort: a failed
    /// write is logged and the reply is still returned to the user.
    async fn persist_reply(
        &self,
        identity: &ConversationId,
        text: &str,
    ) -> Option<ChatMessage> {
        let message = ChatMessage {
            id: String::new(),
            userid: identity.0.clone(),
            content: text.to_string(),
            is_from_user: false,
            created_at: String::new(),
        };
        match self.records.insert_message(&message).await {
            Ok(stored) => Some(stored),
            Err(err) => {
                warn!(identity = %identity, error = %err, "failed to persist assistant reply");
                None
            }
        }
    }

    /// Converts a turn-level failure into the transport-facing outcome.
    /// Stored conversation state has been left at its pre-failure value.
    async fn outcome_for_error(
        &self,
        identity: &ConversationId,
        err: MigralogError,
    ) -> HandleOutcome {
        match err {
            MigralogError::Transcription => {
                let stored = self.persist_reply(identity, REPEAT_REQUEST).await;
                HandleOutcome::error(
                    ErrorKind::Transcription,
                    Some(ReplyPayload {
                        message_id: stored.as_ref().map(|msg| msg.id.clone()),
                        text: REPEAT_REQUEST.to_string(),
                        options: None,
                        is_custom_option_allowed: None,
                        created_at: stored.map(|msg| msg.created_at),
                    }),
                )
            }
            MigralogError::UnknownQuestion { role, index } => {
                error!(identity = %identity, %role, index, "reply referenced an unknown question");
                HandleOutcome::error(
                    ErrorKind::UnknownQuestion,
                    Some(ReplyPayload {
                        text: QUESTION_NOT_FOUND.to_string(),
                        ..Default::default()
                    }),
                )
            }
            err @ (MigralogError::Assistant { .. } | MigralogError::Timeout { .. }) => {
                error!(identity = %identity, error = %err, "assistant turn failed");
                HandleOutcome::error(ErrorKind::Assistant, None)
            }
            err => {
                error!(identity = %identity, error = %err, "internal error while processing message");
                HandleOutcome::error(ErrorKind::Internal, None)
            }
        }
    }
}
