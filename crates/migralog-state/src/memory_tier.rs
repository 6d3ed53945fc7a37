// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process state tier.
//!
//! Serves as the fallback tier of the dual-tier store: writes made here
//! during a remote outage stay visible for the remainder of the process
//! lifetime. No cross-process consistency is provided.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;

use migralog_core::MigralogError;

use crate::tier::StateTier;

#[derive(Debug, Clone)]
enum Entry {
    Value(String),
    Set(HashSet<String>),
}

/// DashMap-backed tier; all operations are infallible in practice.
#[derive(Debug, Default)]
pub struct MemoryTier {
    entries: DashMap<String, Entry>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys, for diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl StateTier for MemoryTier {
    async fn get(&self, key: &str) -> Result<Option<String>, MigralogError> {
        Ok(self.entries.get(key).and_then(|e| match e.value() {
            Entry::Value(v) => Some(v.clone()),
            Entry::Set(_) => None,
        }))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), MigralogError> {
        self.entries
            .insert(key.to_string(), Entry::Value(value.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), MigralogError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), MigralogError> {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(HashSet::new()));
        let value = entry.value_mut();
        if let Entry::Set(set) = value {
            set.insert(member.to_string());
        } else {
            // A value key overwritten by a set operation becomes a set.
            let mut set = HashSet::new();
            set.insert(member.to_string());
            *value = Entry::Set(set);
        }
        Ok(())
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, MigralogError> {
        Ok(self
            .entries
            .get(key)
            .map(|e| match e.value() {
                Entry::Set(set) => set.contains(member),
                Entry::Value(_) => false,
            })
            .unwrap_or(false))
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, MigralogError> {
        Ok(self
            .entries
            .get(key)
            .map(|e| match e.value() {
                Entry::Set(set) => set.iter().cloned().collect(),
                Entry::Value(_) => Vec::new(),
            })
            .unwrap_or_default())
    }
}
