use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

pub(super) struct MemoryEntry {
    pub(super) data: CacheData,
    pub(super) expires_at: Option<DateTime<Utc>>,
}

/// Process-local cache store. Entries honour their TTL on read, and expired
/// entries are swept out as the map grows.
pub struct InMemoryCacheStore {
    pub(super) entry: Mutex<HashMap<String, MemoryEntry>>,
    /// Map size at which the next write sweeps expired entries.
    pub(super) sweep_at: AtomicUsize,
}

/// Redis-backed cache store, suitable for sharing sessions between processes.
pub struct RedisCacheStore {
    pub(super) client: redis::Client,
}

/// Keyed blob store with TTL, used for sessions and flash messages.
///
/// Implementations must be safe to share between any number of concurrent
/// requests; every method takes `&self` and synchronizes internally.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store with a TTL in seconds.
    async fn put_with_ttl(
        &self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError>;

    /// Get a value from the store. Expired entries are reported as absent.
    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store.
    async fn remove(&self, prefix: &str, key: &str) -> Result<(), StorageError>;

    /// Atomically get a value and remove it.
    ///
    /// When several callers race on the same key, at most one of them
    /// receives the value.
    async fn take(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError>;
}
