// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the assistant threads API.
//!
//! Provides [`AssistantClient`] which handles request construction,
//! authentication, run polling, and transient error retry.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use migralog_config::model::AssistantConfig;
use migralog_core::{MigralogError, ThreadHandle};

use crate::types::{
    ApiErrorResponse, MessageList, MessageObject, MessageRequest, RunObject, RunRequest,
    ThreadObject,
};

/// HTTP client for assistant API communication.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    turn_timeout: Duration,
    max_retries: u32,
}

impl AssistantClient {
    /// Creates a new assistant API client from configuration.
    ///
    /// Fails when no API key is configured.
    pub fn new(config: &AssistantConfig) -> Result<Self, MigralogError> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            MigralogError::Config("assistant.api_key is required".into())
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            MigralogError::Config(format!("invalid API key header value: {e}"))
        })?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| MigralogError::Assistant {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            turn_timeout: Duration::from_secs(config.turn_timeout_secs),
            max_retries: 1,
        })
    }

    /// Creates a fresh conversation thread.
    pub async fn create_thread(&self) -> Result<ThreadHandle, MigralogError> {
        let thread: ThreadObject = self
            .post_json("/threads", &serde_json::json!({}))
            .await?;
        debug!(thread_id = %thread.id, "created assistant thread");
        Ok(ThreadHandle(thread.id))
    }

    /// Posts a user message to a thread.
    pub async fn post_message(
        &self,
        thread: &ThreadHandle,
        content: &str,
    ) -> Result<MessageObject, MigralogError> {
        let body = serde_json::to_value(MessageRequest {
            role: "user".into(),
            content: content.into(),
        })
        .map_err(|e| MigralogError::Internal(e.to_string()))?;
        self.post_json(&format!("/threads/{}/messages", thread.0), &body)
            .await
    }

    /// Starts a run of the given assistant over the thread.
    pub async fn create_run(
        &self,
        thread: &ThreadHandle,
        assistant_id: &str,
    ) -> Result<RunObject, MigralogError> {
        let body = serde_json::to_value(RunRequest {
            assistant_id: assistant_id.into(),
        })
        .map_err(|e| MigralogError::Internal(e.to_string()))?;
        self.post_json(&format!("/threads/{}/runs", thread.0), &body)
            .await
    }

    /// Fetches the current state of a run.
    pub async fn get_run(
        &self,
        thread: &ThreadHandle,
        run_id: &str,
    ) -> Result<RunObject, MigralogError> {
        self.get_json(&format!("/threads/{}/runs/{}", thread.0, run_id))
            .await
    }

    /// Lists the thread's messages, newest first.
    pub async fn list_messages(
        &self,
        thread: &ThreadHandle,
    ) -> Result<MessageList, MigralogError> {
        self.get_json(&format!("/threads/{}/messages", thread.0))
            .await
    }

    /// Polls a run until it leaves the pending states, bounded by the
    /// configured turn timeout so a hung run cannot stall its thread queue.
    pub async fn wait_for_run(
        &self,
        thread: &ThreadHandle,
        run: RunObject,
    ) -> Result<RunObject, MigralogError> {
        let poll = async {
            let mut run = run;
            while run.is_pending() {
                tokio::time::sleep(self.poll_interval).await;
                run = self.get_run(thread, &run.id).await?;
                debug!(run_id = %run.id, status = %run.status, "run status updated");
            }
            Ok(run)
        };
        tokio::time::timeout(self.turn_timeout, poll)
            .await
            .map_err(|_| MigralogError::Timeout {
                duration: self.turn_timeout,
            })?
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, MigralogError> {
        self.request_json(|url| self.client.post(url).json(body), path)
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, MigralogError> {
        self.request_json(|url| self.client.get(url), path).await
    }

    /// Sends a request, retrying once on transient errors (429, 500, 503).
    async fn request_json<T, F>(&self, make: F, path: &str) -> Result<T, MigralogError>
    where
        T: DeserializeOwned,
        F: Fn(String) -> reqwest::RequestBuilder,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, path, "retrying assistant request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = make(url.clone())
                .send()
                .await
                .map_err(|e| MigralogError::Assistant {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, path, "assistant response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| MigralogError::Assistant {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&body).map_err(|e| MigralogError::Assistant {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "assistant API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(MigralogError::Assistant {
                    message,
                    source: None,
                });
                continue;
            }

            return Err(MigralogError::Assistant {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| MigralogError::Assistant {
            message: "assistant request failed after retries".into(),
            source: None,
        }))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
