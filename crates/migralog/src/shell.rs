// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `migralog shell` command implementation.
//!
//! Launches an interactive REPL that feeds each line through
//! [`Orchestrator::handle_inbound_message`], exercising the full
//! registration/survey dialogue without a wire transport. Requires the
//! assistant API to be configured; Redis is optional (the state store
//! degrades to its in-process fallback when unreachable).

use std::sync::Arc;

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{info, warn};

use migralog_assistant::AssistantProvider;
use migralog_config::MigralogConfig;
use migralog_core::{
    AssistantAdapter, ConversationId, HandleStatus, IdentityTranslator, InboundContent,
    MessageId, MigralogError, PassthroughTranscriber, RecordStore,
};
use migralog_dialogue::Orchestrator;
use migralog_state::{DualTierStore, RedisTier, StateTier};
use migralog_storage::SqliteRecords;

/// Runs the interactive REPL.
pub async fn run_shell(config: MigralogConfig) -> Result<(), MigralogError> {
    // Relational records.
    let records = Arc::new(SqliteRecords::new(config.storage.clone()));
    records.initialize().await?;

    // Remote state tier is best-effort: without it the dual-tier store runs
    // on its in-process fallback.
    let remote: Option<Arc<dyn StateTier>> = match RedisTier::connect(&config.redis).await {
        Ok(tier) => Some(Arc::new(tier)),
        Err(err) => {
            warn!(error = %err, "redis unreachable, continuing on the fallback tier");
            None
        }
    };
    let store = Arc::new(DualTierStore::new(remote));

    let assistant: Arc<dyn AssistantAdapter> =
        Arc::new(AssistantProvider::new(&config.assistant).inspect_err(|_| {
            eprintln!(
                "error: assistant API not configured. Set assistant.api_key and both assistant ids in migralog.toml or via MIGRALOG_ASSISTANT_* env vars"
            );
        })?);

    let orchestrator = Orchestrator::new(
        store,
        assistant,
        Arc::new(PassthroughTranscriber),
        Arc::new(IdentityTranslator),
        Arc::clone(&records) as Arc<dyn RecordStore>,
        config.agent.native_language.clone(),
    );

    let identity = ConversationId(format!("shell-{}", whoami()));
    info!(identity = %identity, "shell session started");
    println!(
        "{}",
        format!("{} shell -- identity {identity}, ctrl-d to exit", config.agent.name).dimmed()
    );

    let mut editor = DefaultEditor::new().map_err(|e| MigralogError::Internal(e.to_string()))?;
    loop {
        match editor.readline(&"you> ".green().to_string()) {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(&line);

                let outcome = orchestrator
                    .handle_inbound_message(
                        &identity,
                        Some(MessageId(uuid::Uuid::new_v4().to_string())),
                        InboundContent::Text(line),
                        &config.agent.native_language,
                    )
                    .await;

                match outcome.status {
                    HandleStatus::Success | HandleStatus::Error => {
                        if let Some(reply) = &outcome.reply {
                            println!("{} {}", "bot>".cyan(), reply.text);
                            if let Some(options) = &reply.options
                                && !options.is_empty()
                            {
                                println!("{}", format!("     [{}]", options.join(" / ")).dimmed());
                            }
                        }
                        if let Some(kind) = outcome.error_kind {
                            println!("{}", format!("error: {kind}").red());
                        }
                    }
                    HandleStatus::Duplicate => {
                        println!("{}", "duplicate message, skipped".dimmed());
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("readline error: {err}");
                break;
            }
        }
    }

    records.close().await?;
    println!("{}", "bye".dimmed());
    Ok(())
}

fn whoami() -> String {
    std::env::var("USER").unwrap_or_else(|_| "local".to_string())
}
