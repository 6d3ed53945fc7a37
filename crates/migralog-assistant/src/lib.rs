// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant adapter for Migralog backed by an OpenAI Assistants-style
//! threads API.
//!
//! One turn is: post the user message to the thread, start a run for the
//! role's assistant id, poll the run to completion, and read back the
//! newest assistant message.

pub mod client;
pub mod types;

use async_trait::async_trait;
use tracing::debug;

use migralog_config::model::AssistantConfig;
use migralog_core::{
    AssistantAdapter, AssistantRole, AssistantTurn, MigralogError, ThreadHandle,
};

pub use client::AssistantClient;

/// [`AssistantAdapter`] implementation over the threads API.
pub struct AssistantProvider {
    client: AssistantClient,
    registration_id: String,
    survey_id: String,
}

impl AssistantProvider {
    /// Builds the provider from configuration.
    ///
    /// Requires an API key and both assistant ids.
    pub fn new(config: &AssistantConfig) -> Result<Self, MigralogError> {
        let client = AssistantClient::new(config)?;
        let registration_id = config
            .registration_assistant_id
            .clone()
            .ok_or_else(|| {
                MigralogError::Config("assistant.registration_assistant_id is required".into())
            })?;
        let survey_id = config.survey_assistant_id.clone().ok_or_else(|| {
            MigralogError::Config("assistant.survey_assistant_id is required".into())
        })?;
        Ok(Self {
            client,
            registration_id,
            survey_id,
        })
    }

    fn assistant_id(&self, role: AssistantRole) -> &str {
        match role {
            AssistantRole::Registration => &self.registration_id,
            AssistantRole::DailySurvey => &self.survey_id,
        }
    }
}

#[async_trait]
impl AssistantAdapter for AssistantProvider {
    async fn create_thread(&self) -> Result<ThreadHandle, MigralogError> {
        self.client.create_thread().await
    }

    async fn converse(
        &self,
        content: &str,
        thread: Option<&ThreadHandle>,
        role: AssistantRole,
    ) -> Result<AssistantTurn, MigralogError> {
        let thread = match thread {
            Some(thread) => thread.clone(),
            None => self.client.create_thread().await?,
        };

        self.client.post_message(&thread, content).await?;
        let run = self
            .client
            .create_run(&thread, self.assistant_id(role))
            .await?;
        let run = self.client.wait_for_run(&thread, run).await?;

        if run.status != "completed" {
            return Err(MigralogError::Assistant {
                message: format!("run {} ended with status {}", run.id, run.status),
                source: None,
            });
        }

        let messages = self.client.list_messages(&thread).await?;
        let reply = messages
            .data
            .iter()
            .find(|msg| msg.role == "assistant")
            .ok_or_else(|| MigralogError::Assistant {
                message: "no assistant message in thread".into(),
                source: None,
            })?;

        let text = reply.text();
        if text.trim().is_empty() {
            return Err(MigralogError::Assistant {
                message: "assistant reply was empty".into(),
                source: None,
            });
        }

        debug!(thread = %thread, role = %role, "assistant turn complete");

        let raw = serde_json::to_value(reply)
            .map_err(|e| MigralogError::Internal(e.to_string()))?;
        Ok(AssistantTurn { text, thread, raw })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(base_url: &str) -> AssistantConfig {
        AssistantConfig {
            api_key: Some("sk-test".into()),
            base_url: base_url.into(),
            registration_assistant_id: Some("asst_reg".into()),
            survey_assistant_id: Some("asst_survey".into()),
            poll_interval_ms: 10,
            turn_timeout_secs: 5,
        }
    }

    async fn mount_turn(server: &MockServer, reply_text: &str) {
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_1"})),
            )
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_user", "role": "user",
                "content": [{"type": "text", "text": {"value": "x"}}]
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "run_1", "status": "completed"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {
                        "id": "msg_reply", "role": "assistant",
                        "content": [{"type": "text", "text": {"value": reply_text}}]
                    },
                    {
                        "id": "msg_user", "role": "user",
                        "content": [{"type": "text", "text": {"value": "x"}}]
                    }
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn converse_without_thread_creates_one() {
        let server = MockServer::start().await;
        mount_turn(&server, "Добрый день! Как вас зовут? [вопрос 1]").await;

        let provider = AssistantProvider::new(&test_config(&server.uri())).unwrap();
        let turn = provider
            .converse("Здравствуйте", None, AssistantRole::Registration)
            .await
            .unwrap();

        assert_eq!(turn.thread.0, "thread_1");
        assert!(turn.text.contains("Как вас зовут?"));
        assert_eq!(turn.raw["id"], "msg_reply");
    }

    #[tokio::test]
    async fn failed_run_surfaces_as_assistant_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_9/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_user", "role": "user",
                "content": [{"type": "text", "text": {"value": "x"}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_9/runs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "run_9", "status": "failed"
            })))
            .mount(&server)
            .await;

        let provider = AssistantProvider::new(&test_config(&server.uri())).unwrap();
        let err = provider
            .converse(
                "7",
                Some(&ThreadHandle("thread_9".into())),
                AssistantRole::DailySurvey,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MigralogError::Assistant { .. }));
    }

    #[tokio::test]
    async fn empty_reply_surfaces_as_assistant_error() {
        let server = MockServer::start().await;
        mount_turn(&server, "   ").await;

        let provider = AssistantProvider::new(&test_config(&server.uri())).unwrap();
        let err = provider
            .converse("Здравствуйте", None, AssistantRole::Registration)
            .await
            .unwrap_err();
        assert!(matches!(err, MigralogError::Assistant { .. }));
    }

    #[tokio::test]
    async fn missing_assistant_ids_fail_construction() {
        let mut config = test_config("http://localhost");
        config.survey_assistant_id = None;
        assert!(AssistantProvider::new(&config).is_err());
    }
}
