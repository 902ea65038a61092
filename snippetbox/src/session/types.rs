use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::session::errors::SessionError;
use crate::storage::CacheData;

/// Attribute bag kept server side for one session token.
///
/// Flash messages are stored separately so they can be popped atomically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionData {
    pub authenticated_user_id: Option<i64>,
    pub csrf_token: Option<String>,
    /// Path a visitor was bounced from by the login gate.
    pub redirect_after_login: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(ttl: u64) -> Self {
        Self {
            authenticated_user_id: None,
            csrf_token: None,
            redirect_after_login: None,
            expires_at: Utc::now() + Duration::seconds(ttl as i64),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

impl TryFrom<&SessionData> for CacheData {
    type Error = SessionError;

    fn try_from(data: &SessionData) -> Result<Self, Self::Error> {
        Ok(Self {
            value: serde_json::to_string(data).map_err(|e| SessionError::Storage(e.to_string()))?,
        })
    }
}

impl TryFrom<CacheData> for SessionData {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| SessionError::Storage(e.to_string()))
    }
}
