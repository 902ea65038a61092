use subtle::ConstantTimeEq;

use crate::session::errors::SessionError;
use crate::utils::gen_random_string;

pub fn generate_csrf_token() -> Result<String, SessionError> {
    Ok(gen_random_string(32)?)
}

/// Compare the session's CSRF token with the one submitted by the client.
///
/// Both must be present and non-empty. The comparison is constant time.
pub fn verify_csrf_token(
    expected: Option<&str>,
    submitted: Option<&str>,
) -> Result<(), SessionError> {
    let expected = expected
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SessionError::CsrfToken("No CSRF token in session".to_string()))?;
    let submitted = submitted
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SessionError::CsrfToken("No CSRF token submitted".to_string()))?;

    if expected.as_bytes().ct_eq(submitted.as_bytes()).into() {
        Ok(())
    } else {
        tracing::warn!("CSRF token mismatch");
        Err(SessionError::CsrfToken("CSRF token mismatch".to_string()))
    }
}
