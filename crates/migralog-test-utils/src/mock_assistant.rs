// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock assistant adapter for deterministic testing.
//!
//! Replies are popped from a FIFO queue; when the queue is empty a default
//! text is returned. Every turn is recorded in an event log so tests can
//! assert that turns on one thread never interleave.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use migralog_core::{
    AssistantAdapter, AssistantRole, AssistantTurn, MigralogError, ThreadHandle,
};

/// A mock assistant with pre-configured replies.
pub struct MockAssistant {
    replies: Arc<Mutex<VecDeque<String>>>,
    events: Arc<Mutex<Vec<String>>>,
    threads_created: AtomicUsize,
    turn_delay: Mutex<Option<Duration>>,
    fail_next: Mutex<bool>,
}

impl MockAssistant {
    /// Creates a mock with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            events: Arc::new(Mutex::new(Vec::new())),
            threads_created: AtomicUsize::new(0),
            turn_delay: Mutex::new(None),
            fail_next: Mutex::new(false),
        }
    }

    /// Creates a mock pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        let mock = Self::new();
        *mock.replies.try_lock().expect("fresh mock") = VecDeque::from(replies);
        mock
    }

    /// Appends a reply to the queue.
    pub async fn add_reply(&self, text: impl Into<String>) {
        self.replies.lock().await.push_back(text.into());
    }

    /// Makes every turn sleep before replying, to widen race windows.
    pub async fn set_turn_delay(&self, delay: Duration) {
        *self.turn_delay.lock().await = Some(delay);
    }

    /// Makes the next `converse` call fail with an assistant error.
    pub async fn fail_next_turn(&self) {
        *self.fail_next.lock().await = true;
    }

    /// The recorded `turn-start`/`turn-end` event log.
    pub async fn events(&self) -> Vec<String> {
        self.events.lock().await.clone()
    }

    /// Number of threads created so far.
    pub fn threads_created(&self) -> usize {
        self.threads_created.load(Ordering::SeqCst)
    }

    async fn next_reply(&self) -> String {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "Хорошо, продолжим.".to_string())
    }

    fn next_thread(&self) -> ThreadHandle {
        let n = self.threads_created.fetch_add(1, Ordering::SeqCst) + 1;
        ThreadHandle(format!("mock-thread-{n}"))
    }
}

impl Default for MockAssistant {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistantAdapter for MockAssistant {
    async fn create_thread(&self) -> Result<ThreadHandle, MigralogError> {
        Ok(self.next_thread())
    }

    async fn converse(
        &self,
        content: &str,
        thread: Option<&ThreadHandle>,
        _role: AssistantRole,
    ) -> Result<AssistantTurn, MigralogError> {
        let thread = match thread {
            Some(thread) => thread.clone(),
            None => self.next_thread(),
        };

        self.events
            .lock()
            .await
            .push(format!("turn-start:{content}"));

        if let Some(delay) = *self.turn_delay.lock().await {
            tokio::time::sleep(delay).await;
        }

        if std::mem::take(&mut *self.fail_next.lock().await) {
            self.events.lock().await.push(format!("turn-fail:{content}"));
            return Err(MigralogError::Assistant {
                message: "mock assistant failure".into(),
                source: None,
            });
        }

        let text = self.next_reply().await;
        self.events.lock().await.push(format!("turn-end:{content}"));

        Ok(AssistantTurn {
            raw: serde_json::json!({"role": "assistant", "text": text}),
            text,
            thread,
        })
    }
}
