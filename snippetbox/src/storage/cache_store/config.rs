use std::{env, sync::Arc, sync::LazyLock};

use crate::storage::errors::StorageError;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

/// Cache backend for sessions: `memory` (default) or `redis`.
pub static GENERIC_CACHE_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_CACHE_STORE_TYPE").unwrap_or_else(|_| "memory".to_string())
});

pub static GENERIC_CACHE_STORE_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_CACHE_STORE_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
});

/// Build and initialize a cache store of the given type.
pub async fn connect_cache_store(
    store_type: &str,
    store_url: &str,
) -> Result<Arc<dyn CacheStore>, StorageError> {
    tracing::info!(
        "Initializing cache store with type: {}, url: {}",
        store_type,
        store_url
    );

    let store: Arc<dyn CacheStore> = match store_type {
        "memory" => Arc::new(InMemoryCacheStore::new()),
        "redis" => {
            let client = redis::Client::open(store_url).map_err(|e| {
                tracing::error!("Failed to create Redis client: {}", e);
                StorageError::from(e)
            })?;
            Arc::new(RedisCacheStore::new(client))
        }
        t => {
            return Err(StorageError::Config(format!(
                "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
            )));
        }
    };

    store.init().await?;

    tracing::info!(
        "Connected to cache store: type={}, url={}",
        store_type,
        store_url
    );

    Ok(store)
}

/// Build the cache store described by `GENERIC_CACHE_STORE_TYPE` and `GENERIC_CACHE_STORE_URL`.
pub async fn cache_store_from_env() -> Result<Arc<dyn CacheStore>, StorageError> {
    connect_cache_store(
        GENERIC_CACHE_STORE_TYPE.as_str(),
        GENERIC_CACHE_STORE_URL.as_str(),
    )
    .await
}
