//! Route table and middleware composition.
//!
//! Each route names a [`Protection`] level. The level expands into an ordered
//! list of [`Stage`]s, outermost first, which are wrapped around that route's
//! handler only. Router-wide layers (recovery, tracing, security headers)
//! are added once in [`build_router`].

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{MethodRouter, get, post},
};
use tower_http::LatencyUnit;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::csrf::csrf_guard;
use crate::error::{debug_error_detail, not_found};
use crate::middleware::{authenticate, require_authentication, security_headers};
use crate::pages::{
    about, account_view, home, password_update, password_update_post, ping, snippet_create,
    snippet_create_post, snippet_view, user_login, user_login_post, user_logout_post,
    user_signup, user_signup_post,
};
use crate::recovery::{PanicResponder, install_panic_hook};
use crate::session::load_and_save_session;
use crate::state::AppState;
use crate::static_files::serve_static;

/// A per-route middleware step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    LoadSession,
    Csrf,
    Authenticate,
    RequireAuthentication,
}

impl Stage {
    fn wrap(self, handler: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
        match self {
            Stage::LoadSession => {
                handler.route_layer(from_fn_with_state(state.clone(), load_and_save_session))
            }
            Stage::Csrf => handler.route_layer(from_fn(csrf_guard)),
            Stage::Authenticate => {
                handler.route_layer(from_fn_with_state(state.clone(), authenticate))
            }
            Stage::RequireAuthentication => handler.route_layer(from_fn(require_authentication)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protection {
    /// No session, CSRF or auth work.
    Public,
    /// Session, CSRF and auth context.
    Dynamic,
    /// Everything `Dynamic` does, then the login gate.
    Protected,
}

impl Protection {
    /// Stages for this level, outermost first.
    pub fn stages(self) -> Vec<Stage> {
        match self {
            Protection::Public => Vec::new(),
            Protection::Dynamic => vec![Stage::LoadSession, Stage::Csrf, Stage::Authenticate],
            Protection::Protected => {
                let mut stages = Protection::Dynamic.stages();
                stages.push(Stage::RequireAuthentication);
                stages
            }
        }
    }

    fn apply(self, handler: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
        // route_layer wraps outside what is already there, so go innermost first
        self.stages()
            .into_iter()
            .rev()
            .fold(handler, |handler, stage| stage.wrap(handler, state))
    }
}

/// One row of the route table. All methods served at `path` share one entry.
pub struct RouteEntry {
    pub path: &'static str,
    pub protection: Protection,
    pub handler: MethodRouter<AppState>,
}

impl RouteEntry {
    pub fn new(
        path: &'static str,
        protection: Protection,
        handler: MethodRouter<AppState>,
    ) -> Self {
        Self {
            path,
            protection,
            handler,
        }
    }
}

/// The application's routes.
pub fn route_table() -> Vec<RouteEntry> {
    use Protection::*;

    vec![
        RouteEntry::new("/static/{*filepath}", Public, get(serve_static)),
        RouteEntry::new("/ping", Public, get(ping)),
        RouteEntry::new("/", Dynamic, get(home)),
        RouteEntry::new("/about", Dynamic, get(about)),
        RouteEntry::new("/snippet/view/{id}", Dynamic, get(snippet_view)),
        RouteEntry::new("/user/signup", Dynamic, get(user_signup).post(user_signup_post)),
        RouteEntry::new("/user/login", Dynamic, get(user_login).post(user_login_post)),
        RouteEntry::new(
            "/snippet/create",
            Protected,
            get(snippet_create).post(snippet_create_post),
        ),
        RouteEntry::new("/user/logout", Protected, post(user_logout_post)),
        RouteEntry::new("/account/view", Protected, get(account_view)),
        RouteEntry::new(
            "/account/password/update",
            Protected,
            get(password_update).post(password_update_post),
        ),
    ]
}

/// Assemble a router from `entries` and wrap it in the router-wide layers.
///
/// Outermost first: panic recovery, HTTP tracing, debug error detail,
/// security headers. Unmatched paths fall through to a 404.
pub fn build_router(entries: Vec<RouteEntry>, state: AppState) -> Router {
    install_panic_hook();
    let debug = state.config.debug;

    let router = entries.into_iter().fold(Router::new(), |router, entry| {
        tracing::debug!(path = entry.path, protection = ?entry.protection, "Registering route");
        router.route(entry.path, entry.protection.apply(entry.handler, &state))
    });

    router
        .fallback(not_found)
        .layer(from_fn(security_headers))
        .layer(from_fn_with_state(state.clone(), debug_error_detail))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(CatchPanicLayer::custom(PanicResponder { debug }))
        .with_state(state)
}

pub fn app_router(state: AppState) -> Router {
    build_router(route_table(), state)
}
