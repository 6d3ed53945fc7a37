// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dual-tier conversation state store.
//!
//! Every operation first attempts the remote tier; on remote failure it
//! serves/records against the in-process fallback tier. Remote errors are
//! logged and swallowed here -- they never propagate to the orchestration
//! layer. Fallback writes made during an outage are retained locally and are
//! NOT written back to the remote tier automatically; repair is read-through
//! only (remote -> fallback) once the remote becomes reachable again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use migralog_core::{ConversationId, MigralogError};

use crate::keys;
use crate::memory_tier::MemoryTier;
use crate::tier::StateTier;

/// Remote-first key/value + set store with in-process fallback.
pub struct DualTierStore {
    remote: Option<Arc<dyn StateTier>>,
    fallback: Arc<MemoryTier>,
    degraded: AtomicBool,
}

impl DualTierStore {
    /// Creates a store over an optional remote tier. `None` means the store
    /// runs fallback-only (remote permanently unreachable at startup).
    pub fn new(remote: Option<Arc<dyn StateTier>>) -> Self {
        if remote.is_none() {
            warn!("state store running without a remote tier; conversation state is process-local");
        }
        Self {
            remote,
            fallback: Arc::new(MemoryTier::new()),
            degraded: AtomicBool::new(false),
        }
    }

    /// True while the last remote operation failed and no repair has run yet.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Fetches a value. Never fails: degrades to fallback data or absence.
    pub async fn get(&self, key: &str) -> Option<String> {
        if let Some(remote) = &self.remote {
            match remote.get(key).await {
                Ok(Some(value)) => {
                    // Read-through: keep the fallback warm with remote data.
                    let _ = self.fallback.set(key, &value).await;
                    self.on_remote_success(key);
                    return Some(value);
                }
                Ok(None) => self.on_remote_success(key),
                Err(err) => self.note_outage(key, &err),
            }
        }
        self.fallback.get(key).await.unwrap_or(None)
    }

    /// Stores a value. A write made during an outage stays visible to
    /// subsequent reads within this process for the remainder of the outage.
    pub async fn set(&self, key: &str, value: &str) {
        if let Some(remote) = &self.remote {
            match remote.set(key, value).await {
                Ok(()) => self.on_remote_success(key),
                Err(err) => self.note_outage(key, &err),
            }
        }
        let _ = self.fallback.set(key, value).await;
    }

    /// Removes a key from both tiers.
    pub async fn delete(&self, key: &str) {
        if let Some(remote) = &self.remote {
            match remote.delete(key).await {
                Ok(()) => self.on_remote_success(key),
                Err(err) => self.note_outage(key, &err),
            }
        }
        let _ = self.fallback.delete(key).await;
    }

    /// Adds a member to the set at `key`.
    pub async fn add_to_set(&self, key: &str, member: &str) {
        if let Some(remote) = &self.remote {
            match remote.sadd(key, member).await {
                Ok(()) => self.on_remote_success(key),
                Err(err) => self.note_outage(key, &err),
            }
        }
        let _ = self.fallback.sadd(key, member).await;
    }

    /// Tests set membership. A remote miss still consults the fallback, which
    /// may hold members recorded during an outage.
    pub async fn is_member(&self, key: &str, member: &str) -> bool {
        if let Some(remote) = &self.remote {
            match remote.sismember(key, member).await {
                Ok(true) => {
                    self.on_remote_success(key);
                    return true;
                }
                Ok(false) => self.on_remote_success(key),
                Err(err) => self.note_outage(key, &err),
            }
        }
        self.fallback.sismember(key, member).await.unwrap_or(false)
    }

    fn note_outage(&self, key: &str, err: &MigralogError) {
        warn!(key, error = %err, "remote state tier unavailable, using fallback");
        self.degraded.store(true, Ordering::SeqCst);
    }

    /// Called after any successful remote operation. The first success after
    /// an outage schedules a best-effort resync of the touched identity's
    /// keys from the remote tier into the fallback.
    fn on_remote_success(&self, key: &str) {
        if self.degraded.swap(false, Ordering::SeqCst)
            && let Some(identity) = keys::identity_of(key)
        {
            self.schedule_repair(identity);
        }
    }

    fn schedule_repair(&self, identity: ConversationId) {
        let Some(remote) = self.remote.clone() else {
            return;
        };
        let fallback = Arc::clone(&self.fallback);
        tokio::spawn(async move {
            match repair_identity(remote.as_ref(), fallback.as_ref(), &identity).await {
                Ok(()) => debug!(%identity, "fallback resynchronized from remote tier"),
                Err(err) => {
                    warn!(%identity, error = %err, "fallback resync failed")
                }
            }
        });
    }
}

/// Pulls one identity's keys from the remote tier into the fallback tier.
async fn repair_identity(
    remote: &dyn StateTier,
    fallback: &MemoryTier,
    identity: &ConversationId,
) -> Result<(), MigralogError> {
    for key in [
        keys::state_key(identity),
        keys::thread_key(identity),
        keys::role_key(identity),
        keys::dialogue_history_key(identity),
    ] {
        if let Some(value) = remote.get(&key).await? {
            fallback.set(&key, &value).await?;
        }
    }

    let processed = keys::processed_key(identity);
    for member in remote.smembers(&processed).await? {
        fallback.sadd(&processed, &member).await?;
    }

    Ok(())
}
