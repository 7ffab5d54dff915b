//! In-memory job store
//!
//! Backs the test suite and Redis-less development runs. Entries carry
//! the same JSON encoding and TTL behavior as the Redis backend: reads
//! past the expiration see nothing.

use crate::store::{KvBackend, KvJobStore, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Raw in-process key-value backend with per-key expiration
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

/// Job store keeping records in process memory
pub type MemoryJobStore = KvJobStore<MemoryBackend>;

impl MemoryJobStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        KvJobStore::new(
            MemoryBackend {
                entries: RwLock::new(HashMap::new()),
                ttl,
            },
            ttl,
        )
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone()))
    }

    async fn put_raw(&self, key: &str, value: String) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }
}
