// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decodes raw assistant text into a [`StructuredReply`].
//!
//! Two embedded shapes are recognized:
//! - a fenced ```json block marks a terminal reply and carries the
//!   completion payload (profile or survey fields to persist);
//! - an inline `[вопрос N]` marker tags a multiple-choice question; N is an
//!   index into the answer-option catalog. The marker is stripped from the
//!   user-visible text.
//!
//! Decoding happens exactly once, at the orchestration boundary.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use migralog_core::StructuredReply;

const JSON_FENCE_OPEN: &str = "```json";
const JSON_FENCE_CLOSE: &str = "```";

fn question_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\[вопрос\s+(\d+)\]").expect("static regex"))
}

/// Parses one assistant reply.
pub fn parse_reply(raw: &str) -> StructuredReply {
    let (visible, completion) = split_completion(raw);

    if let Some(fields) = completion {
        return StructuredReply::Completion {
            text: visible.trim().to_string(),
            fields,
        };
    }

    if let Some(captures) = question_marker().captures(&visible) {
        // An index too large for u32 cannot be a catalog index; treat the
        // marker as plain text.
        if let Ok(index) = captures[1].parse::<u32>() {
            let marker = captures.get(0).expect("whole match").range();
            let mut text = visible.clone();
            text.replace_range(marker, "");
            return StructuredReply::Question {
                text: text.trim().to_string(),
                index,
            };
        }
    }

    StructuredReply::Text {
        text: visible.trim().to_string(),
    }
}

/// Splits a fenced ```json completion block off the visible text.
///
/// A fenced block that does not parse as a JSON object is dropped from the
/// visible text but yields no completion (logged): a malformed terminal
/// payload must not be mistaken for a plain answer containing backticks.
fn split_completion(
    raw: &str,
) -> (String, Option<serde_json::Map<String, serde_json::Value>>) {
    let Some(open) = raw.find(JSON_FENCE_OPEN) else {
        return (raw.to_string(), None);
    };
    let body_start = open + JSON_FENCE_OPEN.len();
    let Some(close_rel) = raw[body_start..].rfind(JSON_FENCE_CLOSE) else {
        return (raw.to_string(), None);
    };

    let payload = raw[body_start..body_start + close_rel].trim();
    let visible = format!(
        "{}{}",
        &raw[..open],
        &raw[body_start + close_rel + JSON_FENCE_CLOSE.len()..]
    );

    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(serde_json::Value::Object(fields)) => (visible, Some(fields)),
        Ok(other) => {
            warn!(kind = %json_kind(&other), "completion block is not a JSON object, ignoring");
            (visible, None)
        }
        Err(err) => {
            warn!(error = %err, "unparseable completion block, ignoring");
            (visible, None)
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
