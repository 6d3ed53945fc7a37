// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Migralog backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Migralog configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MigralogConfig {
    /// Service identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// External assistant API settings.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Remote state-store (Redis) settings.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Relational storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Service identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the service.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Language the assistant personas speak natively. User messages in
    /// other languages are translated into this one and replies back.
    #[serde(default = "default_native_language")]
    pub native_language: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            native_language: default_native_language(),
        }
    }
}

fn default_agent_name() -> String {
    "migralog".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_native_language() -> String {
    "ru".to_string()
}

/// External assistant API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// API key. `None` requires the environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the assistant threads API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Assistant id addressed for the registration flow.
    #[serde(default)]
    pub registration_assistant_id: Option<String>,

    /// Assistant id addressed for the daily-survey flow.
    #[serde(default)]
    pub survey_assistant_id: Option<String>,

    /// Interval between run-status polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on how long one turn may run, in seconds.
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            registration_assistant_id: None,
            survey_assistant_id: None,
            poll_interval_ms: default_poll_interval_ms(),
            turn_timeout_secs: default_turn_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_turn_timeout_secs() -> u64 {
    120
}

/// Remote state-store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1/".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

/// Relational storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("migralog").join("migralog.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("migralog.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}
