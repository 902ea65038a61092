mod config;
mod errors;
mod main;
mod types;

pub use config::{SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};
pub use errors::SessionError;
pub use main::{
    SessionStore, generate_csrf_token, get_session_id_from_headers, set_session_cookie,
    verify_csrf_token,
};
pub use types::SessionData;
