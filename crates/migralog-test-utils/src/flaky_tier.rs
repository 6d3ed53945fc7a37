// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A remote state tier with a failure switch, for simulating Redis outages.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use migralog_core::MigralogError;
use migralog_state::{MemoryTier, StateTier};

/// Wraps a [`MemoryTier`] and fails every operation while switched down.
#[derive(Default)]
pub struct FlakyTier {
    inner: MemoryTier,
    down: AtomicBool,
}

impl FlakyTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches the simulated outage on or off.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn is_down(&self) -> bool {
        self.down.load(Ordering::SeqCst)
    }

    /// Direct access to the backing tier, for seeding remote-only data.
    pub fn inner(&self) -> &MemoryTier {
        &self.inner
    }

    fn check(&self) -> Result<(), MigralogError> {
        if self.is_down() {
            Err(MigralogError::StateStore {
                message: "simulated outage: connection refused".into(),
                source: None,
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StateTier for FlakyTier {
    async fn get(&self, key: &str) -> Result<Option<String>, MigralogError> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), MigralogError> {
        self.check()?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), MigralogError> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), MigralogError> {
        self.check()?;
        self.inner.sadd(key, member).await
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, MigralogError> {
        self.check()?;
        self.inner.sismember(key, member).await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, MigralogError> {
        self.check()?;
        self.inner.smembers(key).await
    }
}
