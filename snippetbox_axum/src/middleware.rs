use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::{
    HeaderValue, Method,
    header::{
        CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
        X_FRAME_OPTIONS, X_XSS_PROTECTION,
    },
    request::Parts,
};
use std::convert::Infallible;

use crate::session::Session;
use crate::state::AppState;

pub(crate) const LOGIN_PATH: &str = "/user/login";
pub(crate) const LOGIN_REQUIRED_FLASH: &str = "Please log in to continue.";

/// Whether the current request belongs to a logged-in account.
///
/// Derived fresh for every request from the session snapshot and the user
/// store; never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub authenticated: bool,
    pub user_id: Option<i64>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    fn user(id: i64) -> Self {
        Self {
            authenticated: true,
            user_id: Some(id),
        }
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .unwrap_or_default())
    }
}

fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Resolve the session's user id into an [`AuthContext`].
///
/// The id only counts if the account still exists. Lookup failures are
/// logged and treated as anonymous.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let session = req.extensions().get::<Session>().cloned();
    let user_id = match session {
        Some(session) => session.user_id().await,
        None => None,
    };

    let auth = match user_id {
        None => AuthContext::anonymous(),
        Some(id) => match state.users.exists(id).await {
            Ok(true) => AuthContext::user(id),
            Ok(false) => {
                tracing::debug!(user_id = id, "Session refers to a missing account");
                AuthContext::anonymous()
            }
            Err(e) => {
                tracing::error!(user_id = id, error = %e, "User lookup failed, treating request as anonymous");
                AuthContext::anonymous()
            }
        },
    };

    req.extensions_mut().insert(auth);
    let response = next.run(req).await;

    if auth.authenticated {
        no_store(response)
    } else {
        response
    }
}

/// Bounce anonymous requests to the login page before the handler runs.
pub async fn require_authentication(req: Request, next: Next) -> Response {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .copied()
        .unwrap_or_default();

    if auth.authenticated {
        return no_store(next.run(req).await);
    }

    tracing::debug!(path = %req.uri().path(), "Unauthenticated request to protected route");

    if let Some(session) = req.extensions().get::<Session>().cloned() {
        session.put_flash(LOGIN_REQUIRED_FLASH).await;
        if req.method() == Method::GET {
            let path = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string());
            session.set_redirect_after_login(&path).await;
        }
    }

    Redirect::to(LOGIN_PATH).into_response()
}

/// Headers applied to every response, including errors and redirects.
pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com",
        ),
    );
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("origin-when-cross-origin"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("deny"));
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("0"));

    response
}
