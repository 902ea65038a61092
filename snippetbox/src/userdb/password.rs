use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::userdb::errors::UserError;
use crate::utils::gen_random_bytes;

/// Hash a password into an Argon2id PHC string.
///
/// Runs on the blocking pool since Argon2 is deliberately expensive.
pub(super) async fn hash_password(password: &str) -> Result<String, UserError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        let salt_bytes = gen_random_bytes(16).map_err(|e| UserError::Hash(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| UserError::Hash(e.to_string()))?;
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::Hash(e.to_string()))
    })
    .await
    .map_err(|e| UserError::Hash(e.to_string()))?
}

/// Check a password against a stored PHC string. A mismatch is `Ok(false)`.
pub(super) async fn verify_password(password: &str, hashed: &str) -> Result<bool, UserError> {
    let password = password.to_string();
    let hashed = hashed.to_string();
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hashed).map_err(|e| UserError::Hash(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(UserError::Hash(e.to_string())),
        }
    })
    .await
    .map_err(|e| UserError::Hash(e.to_string()))?
}
