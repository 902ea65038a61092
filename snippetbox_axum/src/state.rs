use std::error::Error;
use std::sync::{Arc, LazyLock};

use snippetbox::{
    CacheStore, DataStore, SessionStore, SnippetStore, UserStore, cache_store_from_env,
    data_store_from_env,
};

/// Include error details and panic traces in 500 responses.
pub static SNIPPETBOX_DEBUG: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("SNIPPETBOX_DEBUG")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
});

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            debug: *SNIPPETBOX_DEBUG,
        }
    }
}

/// Handles shared by every request. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub users: UserStore,
    pub snippets: SnippetStore,
    pub config: AppConfig,
}

impl AppState {
    /// Build the state over the given stores and create any missing tables.
    pub async fn new(
        cache: Arc<dyn CacheStore>,
        data: Arc<dyn DataStore>,
        config: AppConfig,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let users = UserStore::new(data.clone());
        let snippets = SnippetStore::new(data);
        users.init().await?;
        snippets.init().await?;

        tracing::info!(debug = config.debug, "Application state initialized");

        Ok(Self {
            sessions: SessionStore::from_env(cache),
            users,
            snippets,
            config,
        })
    }

    /// Build the state from the `GENERIC_*_STORE_*` environment variables.
    pub async fn from_env() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let cache = cache_store_from_env().await?;
        let data = data_store_from_env().await?;
        Self::new(cache, data, AppConfig::from_env()).await
    }
}
