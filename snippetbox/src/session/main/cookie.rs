use http::header::{COOKIE, HeaderMap};

use crate::session::config::SESSION_COOKIE_NAME;
use crate::session::errors::SessionError;
use crate::utils::header_set_cookie;

/// Extract the session token from the request's `Cookie` headers.
///
/// Every `Cookie` header is inspected, since HTTP/2 clients may split cookies
/// across several header lines. Headers that are not valid ASCII are ignored.
pub fn get_session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    let cookie_name = SESSION_COOKIE_NAME.as_str();

    let session_id = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| match value.to_str() {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::debug!("Skipping invalid cookie header: {}", e);
                None
            }
        })
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|s| {
            let mut parts = s.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(k), Some(v)) if k == cookie_name && !v.is_empty() => Some(v),
                _ => None,
            }
        });

    if session_id.is_none() {
        tracing::trace!("No session cookie '{}' found in cookies", cookie_name);
    }

    session_id
}

/// Append a `Set-Cookie` header carrying the session token.
pub fn set_session_cookie(
    headers: &mut HeaderMap,
    token: &str,
    max_age: u64,
) -> Result<(), SessionError> {
    let max_age = i64::try_from(max_age)
        .map_err(|_| SessionError::Cookie(format!("Max-Age out of range: {max_age}")))?;
    header_set_cookie(headers, SESSION_COOKIE_NAME.as_str(), token, max_age)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use http::header::SET_COOKIE;

    fn headers_with(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn test_session_id_found_among_other_cookies() {
        let name = SESSION_COOKIE_NAME.as_str();
        let headers = headers_with(&[&format!("theme=dark; {name}=abc123; lang=en")]);
        assert_eq!(get_session_id_from_headers(&headers), Some("abc123"));
    }

    #[test]
    fn test_session_id_in_second_cookie_header() {
        let name = SESSION_COOKIE_NAME.as_str();
        let headers = headers_with(&["theme=dark", &format!("{name}=xyz")]);
        assert_eq!(get_session_id_from_headers(&headers), Some("xyz"));
    }

    #[test]
    fn test_missing_or_empty_session_cookie() {
        assert_eq!(get_session_id_from_headers(&HeaderMap::new()), None);

        let name = SESSION_COOKIE_NAME.as_str();
        let headers = headers_with(&[&format!("{name}=")]);
        assert_eq!(get_session_id_from_headers(&headers), None);

        let headers = headers_with(&[&format!("{name}x=abc")]);
        assert_eq!(get_session_id_from_headers(&headers), None);
    }

    #[test]
    fn test_set_session_cookie_uses_configured_name() {
        let mut headers = HeaderMap::new();
        set_session_cookie(&mut headers, "tok", 60).unwrap();

        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(&format!("{}=tok;", SESSION_COOKIE_NAME.as_str())));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.ends_with("Max-Age=60"));
    }
}
