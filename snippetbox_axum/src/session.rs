use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use http::{HeaderValue, header::VARY, request::Parts};
use std::sync::Arc;
use tokio::sync::Mutex;

use snippetbox::{
    SessionData, SessionError, SessionStore, generate_csrf_token, get_session_id_from_headers,
    set_session_cookie,
};

use crate::error::AppError;
use crate::state::AppState;

struct SessionState {
    /// Token the session is stored under. `None` until first saved or rotated.
    token: Option<String>,
    data: SessionData,
    modified: bool,
    pending_flash: Option<String>,
}

/// Per-request session handle.
///
/// Loaded once when the request enters the dynamic stack; handlers and later
/// stages read and write through it and never touch the store directly.
/// Changes are written back by [`load_and_save_session`] before the response
/// leaves the stack.
#[derive(Clone)]
pub struct Session {
    store: SessionStore,
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    fn new(store: SessionStore, loaded: Option<(String, SessionData)>) -> Self {
        let state = match loaded {
            Some((token, data)) => SessionState {
                token: Some(token),
                data,
                modified: false,
                pending_flash: None,
            },
            None => SessionState {
                token: None,
                data: store.new_session(),
                modified: false,
                pending_flash: None,
            },
        };

        Self {
            store,
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn user_id(&self) -> Option<i64> {
        self.inner.lock().await.data.authenticated_user_id
    }

    pub async fn csrf_token(&self) -> Option<String> {
        self.inner.lock().await.data.csrf_token.clone()
    }

    /// Return the session's CSRF token, minting one if it has none yet.
    pub async fn ensure_csrf_token(&self) -> Result<String, SessionError> {
        let mut state = self.inner.lock().await;
        if let Some(token) = &state.data.csrf_token {
            return Ok(token.clone());
        }
        let token = generate_csrf_token()?;
        state.data.csrf_token = Some(token.clone());
        state.modified = true;
        Ok(token)
    }

    /// Queue a one-shot message for the next page this visitor renders.
    pub async fn put_flash(&self, message: &str) {
        let mut state = self.inner.lock().await;
        state.pending_flash = Some(message.to_string());
        state.modified = true;
    }

    /// Take the flash message, if any. It is never returned twice.
    pub async fn pop_flash(&self) -> Result<Option<String>, SessionError> {
        let mut state = self.inner.lock().await;
        if let Some(message) = state.pending_flash.take() {
            return Ok(Some(message));
        }
        match &state.token {
            Some(token) => self.store.take_flash(token).await,
            None => Ok(None),
        }
    }

    /// Move the session to a fresh token with a fresh CSRF token and lifetime.
    ///
    /// The old token stops working immediately.
    pub async fn renew_token(&self) -> Result<(), SessionError> {
        let mut state = self.inner.lock().await;
        Self::renew_locked(&self.store, &mut state).await
    }

    async fn renew_locked(
        store: &SessionStore,
        state: &mut SessionState,
    ) -> Result<(), SessionError> {
        let token = store.rotate(state.token.as_deref()).await?;
        tracing::debug!("Session token rotated");
        state.token = Some(token);
        state.data.csrf_token = Some(generate_csrf_token()?);
        state.data.expires_at = Utc::now() + Duration::seconds(store.ttl() as i64);
        state.modified = true;
        Ok(())
    }

    pub async fn login(&self, user_id: i64) -> Result<(), SessionError> {
        let mut state = self.inner.lock().await;
        Self::renew_locked(&self.store, &mut state).await?;
        state.data.authenticated_user_id = Some(user_id);
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        let mut state = self.inner.lock().await;
        Self::renew_locked(&self.store, &mut state).await?;
        state.data.authenticated_user_id = None;
        Ok(())
    }

    /// Remember a local path to return to after login. Anything that is not
    /// an absolute local path is ignored.
    pub async fn set_redirect_after_login(&self, path: &str) {
        if !path.starts_with('/') || path.starts_with("//") || path.starts_with("/\\") {
            tracing::debug!(path, "Refusing non-local redirect path");
            return;
        }
        let mut state = self.inner.lock().await;
        state.data.redirect_after_login = Some(path.to_string());
        state.modified = true;
    }

    pub async fn pop_redirect_after_login(&self) -> Option<String> {
        let mut state = self.inner.lock().await;
        let path = state.data.redirect_after_login.take();
        if path.is_some() {
            state.modified = true;
        }
        path
    }

    /// Persist pending changes. Returns the token and remaining lifetime the
    /// client cookie must carry, or `None` when nothing changed.
    async fn commit(&self) -> Result<Option<(String, u64)>, SessionError> {
        let mut state = self.inner.lock().await;
        if !state.modified {
            return Ok(None);
        }

        let token = match &state.token {
            Some(token) => token.clone(),
            None => {
                let token = SessionStore::new_token()?;
                state.token = Some(token.clone());
                token
            }
        };

        self.store.save(&token, &state.data).await?;
        if let Some(message) = state.pending_flash.take() {
            self.store.put_flash(&token, &message).await?;
        }
        state.modified = false;

        let remaining = (state.data.expires_at - Utc::now()).num_seconds().max(1) as u64;
        Ok(Some((token, remaining)))
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::ServerError("Session layer not installed".to_string()))
    }
}

/// Load the session at chain entry and save it before the response leaves.
///
/// A store failure on either side is a 500: the request must not proceed on
/// session state that could not be read, nor report success for state that
/// could not be written.
pub async fn load_and_save_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let loaded = match get_session_id_from_headers(req.headers()) {
        Some(token) => match state.sessions.load(token).await {
            Ok(data) => data.map(|data| (token.to_string(), data)),
            Err(e) => return AppError::from(e).into_response(),
        },
        None => None,
    };

    let session = Session::new(state.sessions.clone(), loaded);
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    match session.commit().await {
        Ok(Some((token, max_age))) => {
            if let Err(e) = set_session_cookie(response.headers_mut(), &token, max_age) {
                return AppError::from(e).into_response();
            }
            response
                .headers_mut()
                .append(VARY, HeaderValue::from_static("Cookie"));
            response
        }
        Ok(None) => response,
        Err(e) => AppError::from(e).into_response(),
    }
}
