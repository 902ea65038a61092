use axum::{
    body::{Body, to_bytes},
    extract::Request,
    middleware::Next,
    response::Response,
};
use http::{HeaderMap, Method, header::CONTENT_TYPE};

use snippetbox::verify_csrf_token;

use crate::error::AppError;
use crate::session::Session;

/// Form field carrying the token in HTML forms.
pub const CSRF_FORM_FIELD: &str = "csrf_token";
/// Header carrying the token for scripted requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

const MAX_FORM_BYTES: usize = 1024 * 1024;

/// The session's CSRF token, exposed to handlers for embedding in forms.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrfToken(pub String);

fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

fn form_field(body: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Mint the CSRF token on safe requests and verify it on unsafe ones.
///
/// Must run inside the session layer. On unsafe methods the body is buffered
/// so the token can be read from the form, then handed on unchanged.
pub async fn csrf_guard(mut req: Request, next: Next) -> Result<Response, AppError> {
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::ServerError("Session layer not installed".to_string()))?;

    if is_safe_method(req.method()) {
        let token = session.ensure_csrf_token().await?;
        req.extensions_mut().insert(CsrfToken(token));
        return Ok(next.run(req).await);
    }

    let expected = session.csrf_token().await;
    let (parts, body) = req.into_parts();

    let bytes = to_bytes(body, MAX_FORM_BYTES).await.map_err(|e| {
        tracing::debug!("Failed to buffer request body: {}", e);
        AppError::BadRequest
    })?;

    let submitted = parts
        .headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            is_form(&parts.headers)
                .then(|| form_field(&bytes, CSRF_FORM_FIELD))
                .flatten()
        });

    if let Err(e) = verify_csrf_token(expected.as_deref(), submitted.as_deref()) {
        tracing::warn!(method = %parts.method, uri = %parts.uri, "Rejected request: {}", e);
        return Err(AppError::BadRequest);
    }

    let mut req = Request::from_parts(parts, Body::from(bytes));
    if let Some(token) = expected {
        req.extensions_mut().insert(CsrfToken(token));
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_safe_methods() {
        assert!(is_safe_method(&Method::GET));
        assert!(is_safe_method(&Method::HEAD));
        assert!(is_safe_method(&Method::OPTIONS));
        assert!(is_safe_method(&Method::TRACE));
        assert!(!is_safe_method(&Method::POST));
        assert!(!is_safe_method(&Method::PUT));
        assert!(!is_safe_method(&Method::PATCH));
        assert!(!is_safe_method(&Method::DELETE));
    }

    #[test]
    fn test_form_field_decodes_value() {
        let body = b"title=Hi&csrf_token=abc%2Bdef&content=x";
        assert_eq!(form_field(body, "csrf_token"), Some("abc+def".to_string()));
        assert_eq!(form_field(body, "missing"), None);
    }

    #[test]
    fn test_is_form() {
        let mut headers = HeaderMap::new();
        assert!(!is_form(&headers));

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        assert!(is_form(&headers));

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("Application/X-WWW-Form-URLEncoded"),
        );
        assert!(is_form(&headers));

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencodedx"),
        );
        assert!(!is_form(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(!is_form(&headers));
    }
}
