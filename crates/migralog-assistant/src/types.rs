// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the assistant threads API.

use serde::{Deserialize, Serialize};

/// A conversation thread on the assistant side.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadObject {
    pub id: String,
}

/// Request body for adding a message to a thread.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    pub role: String,
    pub content: String,
}

/// Request body for starting a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest {
    pub assistant_id: String,
}

/// A run and its lifecycle status.
#[derive(Debug, Clone, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub status: String,
}

impl RunObject {
    /// True while the run is still making progress.
    pub fn is_pending(&self) -> bool {
        matches!(self.status.as_str(), "queued" | "in_progress" | "cancelling")
    }
}

/// Paginated message listing, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageList {
    pub data: Vec<MessageObject>,
}

/// One message of a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageObject {
    pub id: String,
    pub role: String,
    pub content: Vec<ContentPart>,
}

impl MessageObject {
    /// Concatenated text of all text content parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| part.text.as_ref().map(|t| t.value.as_str()))
            .collect::<Vec<_>>()
            .join("")
    }
}

/// One content block of a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextPart>,
}

/// Text payload of a content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPart {
    pub value: String,
}

/// Error envelope returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_pending_statuses() {
        for status in ["queued", "in_progress", "cancelling"] {
            let run = RunObject {
                id: "run_1".into(),
                status: status.into(),
            };
            assert!(run.is_pending(), "{status} should be pending");
        }
        for status in ["completed", "failed", "expired", "requires_action"] {
            let run = RunObject {
                id: "run_1".into(),
                status: status.into(),
            };
            assert!(!run.is_pending(), "{status} should be terminal");
        }
    }

    #[test]
    fn message_text_joins_text_parts_only() {
        let msg: MessageObject = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "role": "assistant",
            "content": [
                {"type": "text", "text": {"value": "Добрый день! "}},
                {"type": "image_file"},
                {"type": "text", "text": {"value": "Как вас зовут?"}}
            ]
        }))
        .unwrap();
        assert_eq!(msg.text(), "Добрый день! Как вас зовут?");
    }
}
