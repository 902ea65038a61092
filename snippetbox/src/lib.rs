//! snippetbox - storage, session and account primitives for the snippetbox web service
//!
//! This crate owns everything below the HTTP layer: the cache store backing
//! sessions, the relational data store backing users and snippets, the
//! session/CSRF token model and form validation helpers. The axum integration
//! lives in `snippetbox_axum`.

mod session;
mod snippetdb;
mod storage;
mod userdb;
mod utils;
pub mod validator;

#[cfg(test)]
mod test_utils;

pub use storage::{
    CacheData, CacheStore, DB_TABLE_PREFIX, DataStore, GENERIC_CACHE_STORE_TYPE,
    GENERIC_CACHE_STORE_URL, GENERIC_DATA_STORE_TYPE, GENERIC_DATA_STORE_URL, InMemoryCacheStore,
    PostgresDataStore, RedisCacheStore, SqliteDataStore, StorageError, cache_store_from_env,
    connect_cache_store, connect_data_store, data_store_from_env,
};

pub use session::{
    SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME, SessionData, SessionError, SessionStore,
    generate_csrf_token, get_session_id_from_headers, set_session_cookie, verify_csrf_token,
};

pub use snippetdb::{Snippet, SnippetError, SnippetStore};
pub use userdb::{User, UserError, UserStore};
pub use utils::{UtilError, gen_random_string};
