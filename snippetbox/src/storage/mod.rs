mod cache_store;
mod data_store;
mod errors;
mod types;

pub use cache_store::{
    CacheStore, GENERIC_CACHE_STORE_TYPE, GENERIC_CACHE_STORE_URL, InMemoryCacheStore,
    RedisCacheStore, cache_store_from_env, connect_cache_store,
};
pub use data_store::{
    DB_TABLE_PREFIX, DataStore, GENERIC_DATA_STORE_TYPE, GENERIC_DATA_STORE_URL,
    PostgresDataStore, SqliteDataStore, connect_data_store, data_store_from_env,
};
pub use errors::StorageError;
pub use types::CacheData;
