//! Redis-backed job store

use crate::store::{KvBackend, KvJobStore, StoreError, StoreResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

/// Raw Redis key-value backend with per-key expiration
pub struct RedisBackend {
    conn: ConnectionManager,
    ttl_secs: u64,
}

/// Job store persisting records in Redis
pub type RedisJobStore = KvJobStore<RedisBackend>;

impl RedisJobStore {
    /// Connects to Redis and verifies the connection with a PING.
    /// Connection failures here are fatal to startup.
    pub async fn connect(redis_url: &str, ttl: Duration) -> StoreResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StoreError::Connection(format!("invalid Redis URL: {}", e)))?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection(format!("failed to connect to Redis: {}", e)))?;

        let _: () = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Connection(format!("Redis ping failed: {}", e)))?;

        let backend = RedisBackend {
            conn,
            ttl_secs: ttl.as_secs().max(1),
        };
        Ok(KvJobStore::new(backend, ttl))
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn put_raw(&self, key: &str, value: String) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        conn.set_ex(key, value, self.ttl_secs)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}
