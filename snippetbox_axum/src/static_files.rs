use axum::{
    extract::Path,
    response::{IntoResponse, Response},
};
use http::{HeaderValue, header::CACHE_CONTROL, header::CONTENT_TYPE};

use crate::error::AppError;

const MAIN_CSS: &str = include_str!("../assets/css/main.css");
const MAIN_JS: &str = include_str!("../assets/js/main.js");

fn lookup(filepath: &str) -> Option<(&'static str, &'static str)> {
    match filepath {
        "css/main.css" => Some((MAIN_CSS, "text/css; charset=utf-8")),
        "js/main.js" => Some((MAIN_JS, "application/javascript; charset=utf-8")),
        _ => None,
    }
}

/// Serve an asset compiled into the binary. Unknown paths are a 404.
pub(crate) async fn serve_static(Path(filepath): Path<String>) -> Result<Response, AppError> {
    let (content, content_type) = lookup(&filepath).ok_or(AppError::NotFound)?;

    let mut response = content.into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=3600"));
    Ok(response)
}
