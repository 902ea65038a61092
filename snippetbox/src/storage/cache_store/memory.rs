use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore, MemoryEntry};

const CACHE_PREFIX: &str = "cache";
const SWEEP_THRESHOLD: usize = 1024;

impl InMemoryCacheStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory generic cache store");
        Self {
            entry: Mutex::new(HashMap::new()),
            sweep_at: AtomicUsize::new(SWEEP_THRESHOLD),
        }
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{key}")
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEntry {
    fn is_live(&self) -> bool {
        self.expires_at.is_none_or(|at| at > Utc::now())
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn put_with_ttl(
        &self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        let ttl = i64::try_from(ttl)
            .map_err(|_| StorageError::Storage(format!("TTL out of range: {ttl}")))?;
        let entry = MemoryEntry {
            data: value,
            expires_at: Some(Utc::now() + Duration::seconds(ttl)),
        };

        let mut entries = self.entry.lock().await;
        if entries.len() >= self.sweep_at.load(Ordering::Relaxed) {
            let before = entries.len();
            entries.retain(|_, e| e.is_live());
            // Next sweep once the live set has doubled
            self.sweep_at.store(
                (entries.len() * 2).max(SWEEP_THRESHOLD),
                Ordering::Relaxed,
            );
            tracing::debug!(
                swept = before - entries.len(),
                remaining = entries.len(),
                "Swept expired cache entries"
            );
        }
        entries.insert(key, entry);
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        let mut entries = self.entry.lock().await;
        match entries.get(&key) {
            Some(entry) if entry.is_live() => Ok(Some(entry.data.clone())),
            Some(_) => {
                entries.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        self.entry.lock().await.remove(&key);
        Ok(())
    }

    async fn take(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        let entry = self.entry.lock().await.remove(&key);
        Ok(entry.filter(MemoryEntry::is_live).map(|entry| entry.data))
    }
}
