use chrono::Utc;
use std::sync::Arc;

use crate::session::config::SESSION_COOKIE_MAX_AGE;
use crate::session::errors::SessionError;
use crate::session::types::SessionData;
use crate::storage::{CacheData, CacheStore};
use crate::utils::gen_random_string;

const SESSION_PREFIX: &str = "session";
const FLASH_PREFIX: &str = "flash";

/// Server-side session storage keyed by an opaque random token.
///
/// Session attributes and the one-shot flash message live in separate cache
/// entries so the flash can be consumed with a single atomic `take`.
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn CacheStore>,
    ttl: u64,
}

impl SessionStore {
    pub fn new(cache: Arc<dyn CacheStore>, ttl: u64) -> Self {
        Self { cache, ttl }
    }

    pub fn from_env(cache: Arc<dyn CacheStore>) -> Self {
        Self::new(cache, *SESSION_COOKIE_MAX_AGE)
    }

    /// Lifetime of a freshly created session, in seconds.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    pub fn new_token() -> Result<String, SessionError> {
        Ok(gen_random_string(32)?)
    }

    pub fn new_session(&self) -> SessionData {
        SessionData::new(self.ttl)
    }

    /// Look up a session. Unknown, expired and undecodable entries all read as `None`.
    #[tracing::instrument(skip(self, token))]
    pub async fn load(&self, token: &str) -> Result<Option<SessionData>, SessionError> {
        let Some(cached) = self.cache.get(SESSION_PREFIX, token).await? else {
            return Ok(None);
        };

        let data = match SessionData::try_from(cached) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Discarding undecodable session: {}", e);
                return Ok(None);
            }
        };

        if data.is_expired() {
            tracing::debug!("Session expired");
            self.cache.remove(SESSION_PREFIX, token).await?;
            return Ok(None);
        }

        Ok(Some(data))
    }

    /// Persist a session until its absolute expiry.
    #[tracing::instrument(skip(self, token, data))]
    pub async fn save(&self, token: &str, data: &SessionData) -> Result<(), SessionError> {
        let remaining = (data.expires_at - Utc::now()).num_seconds().max(1) as usize;
        self.cache
            .put_with_ttl(SESSION_PREFIX, token, CacheData::try_from(data)?, remaining)
            .await?;
        Ok(())
    }

    /// Remove a session together with any unread flash message.
    #[tracing::instrument(skip(self, token))]
    pub async fn destroy(&self, token: &str) -> Result<(), SessionError> {
        self.cache.remove(SESSION_PREFIX, token).await?;
        self.cache.remove(FLASH_PREFIX, token).await?;
        Ok(())
    }

    /// Issue a fresh token, retiring `old` if there was one.
    ///
    /// An unread flash message follows the session to its new token.
    #[tracing::instrument(skip(self, old))]
    pub async fn rotate(&self, old: Option<&str>) -> Result<String, SessionError> {
        let token = Self::new_token()?;
        if let Some(old) = old {
            let flash = self.take_flash(old).await?;
            self.destroy(old).await?;
            if let Some(flash) = flash {
                self.put_flash(&token, &flash).await?;
            }
        }
        Ok(token)
    }

    pub async fn put_flash(&self, token: &str, message: &str) -> Result<(), SessionError> {
        let data = CacheData {
            value: message.to_string(),
        };
        self.cache
            .put_with_ttl(FLASH_PREFIX, token, data, self.ttl.max(1) as usize)
            .await?;
        Ok(())
    }

    /// Consume the flash message. Of any number of concurrent callers at most one receives it.
    pub async fn take_flash(&self, token: &str) -> Result<Option<String>, SessionError> {
        Ok(self
            .cache
            .take(FLASH_PREFIX, token)
            .await?
            .map(|data| data.value))
    }
}
