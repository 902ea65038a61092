use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use thiserror::Error;

use snippetbox::{SessionError, SnippetError, UserError};

use crate::state::AppState;

/// Errors a handler or middleware stage can return as a value.
///
/// Client errors render as the bare status text. Server errors are logged in
/// full and, when debug mode is on, their description replaces the body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request")]
    BadRequest,

    #[error("Not found")]
    NotFound,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("User error: {0}")]
    User(#[from] UserError),

    #[error("Snippet error: {0}")]
    Snippet(#[from] SnippetError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest => StatusCode::BAD_REQUEST,
            AppError::NotFound | AppError::Snippet(SnippetError::NotFound) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Description of a server error, attached to the response for the debug layer.
#[derive(Clone, Debug)]
pub(crate) struct ErrorDetail(pub(crate) String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let text = status.canonical_reason().unwrap_or("Error");

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            let mut response = (status, text).into_response();
            response
                .extensions_mut()
                .insert(ErrorDetail(self.to_string()));
            response
        } else {
            tracing::debug!(error = %self, %status, "Client error");
            (status, text).into_response()
        }
    }
}

/// Swap the generic body of a 500 for its error description in debug mode.
pub(crate) async fn debug_error_detail(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;
    if !state.config.debug {
        return response;
    }

    match response.extensions().get::<ErrorDetail>().cloned() {
        Some(ErrorDetail(detail)) => (response.status(), detail).into_response(),
        None => response,
    }
}

pub(crate) async fn not_found() -> AppError {
    AppError::NotFound
}
