#![allow(dead_code)]

use axum::{Router, body::Body, body::to_bytes, response::Response};
use http::{Request, StatusCode, header};
use std::sync::Arc;
use tower::ServiceExt;

use snippetbox::{DataStore, InMemoryCacheStore, SESSION_COOKIE_NAME, connect_data_store};
use snippetbox_axum::{AppConfig, AppState};

/// Fresh state over an in-memory cache and an in-memory SQLite database.
///
/// The data store handle is returned as well so tests can break it.
pub async fn test_state() -> (AppState, Arc<dyn DataStore>) {
    let data = connect_data_store("sqlite", "sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let state = AppState::new(
        Arc::new(InMemoryCacheStore::new()),
        data.clone(),
        AppConfig { debug: false },
    )
    .await
    .expect("state");
    (state, data)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Drives a router like a browser with a one-cookie jar.
#[derive(Clone)]
pub struct TestClient {
    app: Router,
    pub session: Option<String>,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self { app, session: None }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.with_cookie(Request::builder().method("GET").uri(uri));
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = self
            .with_cookie(Request::builder().method("POST").uri(uri))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    /// GET `page`, scrape its CSRF token, then POST the form with it.
    pub async fn submit(&mut self, page: &str, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let form_page = self.get(page).await;
        let token = extract_csrf_token(&form_page.body).expect("csrf token on page");
        let mut fields = fields.to_vec();
        fields.push(("csrf_token", token.as_str()));
        self.post_form(uri, &fields).await
    }

    fn with_cookie(&self, builder: http::request::Builder) -> http::request::Builder {
        match &self.session {
            Some(token) => builder.header(header::COOKIE, format!("{}={}", *SESSION_COOKIE_NAME, token)),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response: Response = self.app.clone().oneshot(request).await.unwrap();
        self.store_cookie(&response);

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn store_cookie(&mut self, response: &Response) {
        let prefix = format!("{}=", *SESSION_COOKIE_NAME);
        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            if let Some(rest) = value.strip_prefix(&prefix) {
                let token = rest.split(';').next().unwrap_or_default();
                self.session = Some(token.to_string());
            }
        }
    }
}

pub fn extract_csrf_token(body: &str) -> Option<String> {
    let marker = "name='csrf_token' value='";
    let start = body.find(marker)? + marker.len();
    let end = body[start..].find('\'')?;
    Some(body[start..start + end].to_string())
}

/// Create an account with `email` and log in as it.
pub async fn signup_and_login(client: &mut TestClient, email: &str) {
    let signup = client
        .submit(
            "/user/signup",
            "/user/signup",
            &[("name", "Alice"), ("email", email), ("password", "pa55word!")],
        )
        .await;
    assert_eq!(signup.status, StatusCode::SEE_OTHER, "{}", signup.body);

    let login = client
        .submit(
            "/user/login",
            "/user/login",
            &[("email", email), ("password", "pa55word!")],
        )
        .await;
    assert_eq!(login.status, StatusCode::SEE_OTHER, "{}", login.body);
}
