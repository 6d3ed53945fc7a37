// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./migralog.toml` > `~/.config/migralog/migralog.toml`
//! > `/etc/migralog/migralog.toml` with environment variable overrides via the
//! `MIGRALOG_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MigralogConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/migralog/migralog.toml` (system-wide)
/// 3. `~/.config/migralog/migralog.toml` (user XDG config)
/// 4. `./migralog.toml` (local directory)
/// 5. `MIGRALOG_*` environment variables
pub fn load_config() -> Result<MigralogConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MigralogConfig::default()))
        .merge(Toml::file("/etc/migralog/migralog.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("migralog/migralog.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("migralog.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<MigralogConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MigralogConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MigralogConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MigralogConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MIGRALOG_REDIS_CONNECT_TIMEOUT_SECS`
/// must map to `redis.connect_timeout_secs`, not `redis.connect.timeout.secs`.
fn env_provider() -> Env {
    Env::prefixed("MIGRALOG_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("assistant_", "assistant.", 1)
            .replacen("redis_", "redis.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
