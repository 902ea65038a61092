use axum::{extract::State, response::Response};
use http::StatusCode;

use crate::error::AppError;
use crate::state::AppState;
use crate::templates::{AboutTemplate, HomeTemplate, RequestContext, render};

pub(crate) async fn home(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let snippets = state.snippets.latest().await?;
    render(
        StatusCode::OK,
        &HomeTemplate {
            data: ctx.template_data().await?,
            snippets,
        },
    )
}

pub(crate) async fn about(ctx: RequestContext) -> Result<Response, AppError> {
    render(
        StatusCode::OK,
        &AboutTemplate {
            data: ctx.template_data().await?,
        },
    )
}

/// Liveness probe. Touches no session or storage state.
pub(crate) async fn ping() -> &'static str {
    "OK"
}
