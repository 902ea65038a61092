mod config;
mod memory;
mod redis;
mod types;

pub use config::{
    GENERIC_CACHE_STORE_TYPE, GENERIC_CACHE_STORE_URL, cache_store_from_env, connect_cache_store,
};
pub use types::{CacheStore, InMemoryCacheStore, RedisCacheStore};
