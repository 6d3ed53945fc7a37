// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Migralog integration tests.

pub mod flaky_tier;
pub mod harness;
pub mod mock_assistant;

pub use flaky_tier::FlakyTier;
pub use harness::{TestBackend, identity, mid, text};
pub use mock_assistant::MockAssistant;
