// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Migralog - a conversational headache-diary backend.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod shell;

/// Migralog - a conversational headache-diary backend.
#[derive(Parser, Debug)]
#[command(name = "migralog", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive dialogue session.
    Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match migralog_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            migralog_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Some(Commands::Shell) => {
            if let Err(err) = shell::run_shell(config).await {
                eprintln!("migralog shell: {err}");
                std::process::exit(1);
            }
        }
        None => {
            println!("migralog: use --help for available commands");
        }
    }
}
