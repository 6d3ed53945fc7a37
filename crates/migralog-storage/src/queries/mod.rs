// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed CRUD operations, one module per table.

pub mod messages;
pub mod surveys;
pub mod users;
