//! Database connection configuration

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::time::Duration;
use std::{env, str::FromStr, sync::Arc, sync::LazyLock};

use crate::storage::errors::StorageError;

use super::types::{DataStore, PostgresDataStore, SqliteDataStore};

/// Relational backend: `sqlite` (default) or `postgres`.
pub static GENERIC_DATA_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_DATA_STORE_TYPE").unwrap_or_else(|_| "sqlite".to_string())
});

pub static GENERIC_DATA_STORE_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_DATA_STORE_URL").unwrap_or_else(|_| "sqlite:snippetbox.db".to_string())
});

/// Table prefix from environment variable
pub static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "sb_".to_string()));

fn is_sqlite_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Connect to the database described by `store_type` and `store_url`.
pub async fn connect_data_store(
    store_type: &str,
    store_url: &str,
) -> Result<Arc<dyn DataStore>, StorageError> {
    tracing::info!(
        "Initializing data store with type: {}, url: {}",
        store_type,
        store_url
    );

    let store: Arc<dyn DataStore> = match store_type {
        "sqlite" => {
            let opts = SqliteConnectOptions::from_str(store_url)?.create_if_missing(true);

            // An in-memory database lives and dies with its connection, so keep
            // exactly one and never recycle it.
            let pool_options = if is_sqlite_memory(store_url) {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None::<Duration>)
                    .max_lifetime(None::<Duration>)
            } else {
                SqlitePoolOptions::new()
            };

            Arc::new(SqliteDataStore::new(pool_options.connect_with(opts).await?))
        }
        "postgres" => Arc::new(PostgresDataStore::new(
            PgPoolOptions::new().connect(store_url).await?,
        )),
        t => {
            return Err(StorageError::Config(format!(
                "Unsupported store type: {t}. Supported types are 'sqlite' and 'postgres'"
            )));
        }
    };

    tracing::info!(
        "Connected to database: type={}, url={}",
        store_type,
        store_url
    );

    Ok(store)
}

/// Connect to the database described by `GENERIC_DATA_STORE_TYPE` and `GENERIC_DATA_STORE_URL`.
pub async fn data_store_from_env() -> Result<Arc<dyn DataStore>, StorageError> {
    connect_data_store(
        GENERIC_DATA_STORE_TYPE.as_str(),
        GENERIC_DATA_STORE_URL.as_str(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Helper struct to safely manage environment variables during tests
    struct EnvVarGuard {
        key: String,
        original_value: Option<String>,
    }

    impl EnvVarGuard {
        fn new(key: &str, value: Option<&str>) -> Self {
            let original_value = env::var(key).ok();

            // Use unsafe block for env var manipulation as it affects global state
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }

            Self {
                key: key.to_string(),
                original_value,
            }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            unsafe {
                match &self.original_value {
                    Some(value) => env::set_var(&self.key, value),
                    None => env::remove_var(&self.key),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn test_db_table_prefix_default() {
        // The LazyLock may already be initialized, so test the same logic it uses
        let _guard = EnvVarGuard::new("DB_TABLE_PREFIX", None);
        let prefix = env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "sb_".to_string());
        assert_eq!(prefix, "sb_");
    }

    #[test]
    #[serial]
    fn test_db_table_prefix_custom() {
        let _guard = EnvVarGuard::new("DB_TABLE_PREFIX", Some("custom_"));
        let prefix = env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "sb_".to_string());
        assert_eq!(prefix, "custom_");
    }

    #[test]
    fn test_is_sqlite_memory() {
        assert!(is_sqlite_memory("sqlite::memory:"));
        assert!(is_sqlite_memory("sqlite:file:test?mode=memory&cache=shared"));
        assert!(!is_sqlite_memory("sqlite:snippetbox.db"));
    }

    #[tokio::test]
    async fn test_connect_sqlite_memory() {
        let store = connect_data_store("sqlite", "sqlite::memory:").await.unwrap();
        assert!(store.as_sqlite().is_some());
        assert!(store.as_postgres().is_none());
    }

    #[tokio::test]
    async fn test_unsupported_store_type() {
        let result = connect_data_store("mysql", "mysql://localhost").await;
        match result {
            Err(StorageError::Config(msg)) => assert!(msg.contains("Unsupported store type")),
            _ => panic!("Expected Config error"),
        }
    }
}
