mod cookie;
mod csrf;
mod session;

pub use cookie::{get_session_id_from_headers, set_session_cookie};
pub use csrf::{generate_csrf_token, verify_csrf_token};
pub use session::SessionStore;
