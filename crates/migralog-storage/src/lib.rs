// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Migralog backend.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, typed CRUD operations for users,
//! messages, and surveys, and the survey/registration data mapper.

pub mod adapter;
pub mod database;
pub mod mapper;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteRecords;
pub use database::Database;
pub use mapper::DataMapper;
pub use models::*;
