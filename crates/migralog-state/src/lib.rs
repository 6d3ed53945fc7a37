// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dual-tier conversation state for the Migralog backend.
//!
//! Session state, thread handles, and the processed-message dedup set live
//! in a remote store (Redis) with an in-process fallback tier that keeps the
//! conversation available during remote outages. The fallback exists solely
//! for continuity, not for performance.

pub mod dedup;
pub mod keys;
pub mod memory_tier;
pub mod redis_tier;
pub mod session;
pub mod store;
pub mod tier;

pub use dedup::DedupGuard;
pub use memory_tier::MemoryTier;
pub use redis_tier::RedisTier;
pub use session::{SessionSnapshot, SessionStore};
pub use store::DualTierStore;
pub use tier::StateTier;
