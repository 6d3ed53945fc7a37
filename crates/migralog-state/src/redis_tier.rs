// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis-backed remote state tier.
//!
//! Uses a multiplexed `ConnectionManager` which transparently reconnects
//! after a dropped connection, so a recovered Redis becomes reachable again
//! without restarting the process.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

use migralog_config::model::RedisConfig;
use migralog_core::MigralogError;

use crate::tier::StateTier;

/// Remote tier of the conversation state store.
#[derive(Clone)]
pub struct RedisTier {
    manager: ConnectionManager,
}

impl RedisTier {
    /// Connects to Redis with the configured bound on connection setup time.
    pub async fn connect(config: &RedisConfig) -> Result<Self, MigralogError> {
        let client = redis::Client::open(config.url.as_str()).map_err(map_redis_err)?;
        let connect = ConnectionManager::new(client);
        let manager = tokio::time::timeout(
            Duration::from_secs(config.connect_timeout_secs),
            connect,
        )
        .await
        .map_err(|_| MigralogError::Timeout {
            duration: Duration::from_secs(config.connect_timeout_secs),
        })?
        .map_err(map_redis_err)?;

        debug!(url = %config.url, "connected to redis state tier");
        Ok(Self { manager })
    }
}

fn map_redis_err(err: redis::RedisError) -> MigralogError {
    MigralogError::StateStore {
        message: err.to_string(),
        source: Some(Box::new(err)),
    }
}

#[async_trait]
impl StateTier for RedisTier {
    async fn get(&self, key: &str) -> Result<Option<String>, MigralogError> {
        let mut conn = self.manager.clone();
        conn.get(key).await.map_err(map_redis_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), MigralogError> {
        let mut conn = self.manager.clone();
        conn.set::<_, _, ()>(key, value).await.map_err(map_redis_err)
    }

    async fn delete(&self, key: &str) -> Result<(), MigralogError> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await.map_err(map_redis_err)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), MigralogError> {
        let mut conn = self.manager.clone();
        conn.sadd::<_, _, ()>(key, member)
            .await
            .map_err(map_redis_err)
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, MigralogError> {
        let mut conn = self.manager.clone();
        conn.sismember(key, member).await.map_err(map_redis_err)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, MigralogError> {
        let mut conn = self.manager.clone();
        conn.smembers(key).await.map_err(map_redis_err)
    }
}
