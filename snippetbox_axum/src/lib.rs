//! snippetbox-axum - the HTTP side of the snippetbox web service
//!
//! Every route is declared with a [`Protection`] level that decides which
//! middleware stages wrap its handler:
//!
//! - `Public`: no session work at all (static assets, `/ping`)
//! - `Dynamic`: session load/save, CSRF mint/verify, auth context resolution
//! - `Protected`: the dynamic stages plus the login gate
//!
//! The whole router is wrapped, outermost first, in panic recovery, HTTP
//! tracing and security headers.
//!
//! ```no_run
//! use snippetbox_axum::{AppState, app_router};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let state = AppState::from_env().await?;
//! let app = app_router(state);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

mod csrf;
mod error;
mod middleware;
mod pages;
mod recovery;
mod router;
mod session;
mod state;
mod static_files;
mod templates;

pub use csrf::{CsrfToken, csrf_guard};
pub use error::AppError;
pub use middleware::{AuthContext, authenticate, require_authentication, security_headers};
pub use recovery::{PanicResponder, install_panic_hook};
pub use router::{Protection, RouteEntry, Stage, app_router, build_router, route_table};
pub use session::{Session, load_and_save_session};
pub use state::{AppConfig, AppState, SNIPPETBOX_DEBUG};
