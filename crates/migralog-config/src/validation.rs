// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use crate::model::MigralogConfig;

/// A single configuration problem, rendered as a miette diagnostic.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct ConfigError {
    pub message: String,
    #[help]
    pub help: Option<String>,
}

impl ConfigError {
    fn new(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate semantic constraints figment cannot express.
///
/// Returns all problems found, not just the first.
pub fn validate_config(config: &MigralogConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::new(
            format!("agent.log_level: unknown level `{}`", config.agent.log_level),
            format!("expected one of: {}", LOG_LEVELS.join(", ")),
        ));
    }

    if config.agent.native_language.is_empty() {
        errors.push(ConfigError::new(
            "agent.native_language must not be empty",
            "use a two-letter language code such as `ru`",
        ));
    }

    if config.assistant.api_key.is_some() {
        if config.assistant.registration_assistant_id.is_none() {
            errors.push(ConfigError::new(
                "assistant.registration_assistant_id is required when an API key is set",
                "set it in migralog.toml or via MIGRALOG_ASSISTANT_REGISTRATION_ASSISTANT_ID",
            ));
        }
        if config.assistant.survey_assistant_id.is_none() {
            errors.push(ConfigError::new(
                "assistant.survey_assistant_id is required when an API key is set",
                "set it in migralog.toml or via MIGRALOG_ASSISTANT_SURVEY_ASSISTANT_ID",
            ));
        }
    }

    if config.assistant.poll_interval_ms == 0 {
        errors.push(ConfigError::new(
            "assistant.poll_interval_ms must be positive",
            "run-status polling needs a non-zero interval",
        ));
    }

    if config.assistant.turn_timeout_secs == 0 {
        errors.push(ConfigError::new(
            "assistant.turn_timeout_secs must be positive",
            "a turn without a timeout could stall its thread queue forever",
        ));
    }

    if !config.redis.url.starts_with("redis://") && !config.redis.url.starts_with("rediss://") {
        errors.push(ConfigError::new(
            format!("redis.url: `{}` is not a redis URL", config.redis.url),
            "expected a redis:// or rediss:// URL",
        ));
    }

    if config.storage.database_path.is_empty() {
        errors.push(ConfigError::new(
            "storage.database_path must not be empty",
            "point it at a writable SQLite file location",
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Print all diagnostics to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    for err in errors {
        eprintln!(
            "{:?}",
            miette::Report::new(ConfigError {
                message: err.message.clone(),
                help: err.help.clone(),
            })
        );
    }
}
