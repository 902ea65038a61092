use askama::Template;
use axum::{
    extract::FromRequestParts,
    response::{Html, IntoResponse, Response},
};
use chrono::{Datelike, Utc};
use http::{StatusCode, request::Parts};

use snippetbox::{Snippet, User};

use crate::csrf::CsrfToken;
use crate::error::AppError;
use crate::middleware::AuthContext;
use crate::pages::{LoginForm, PasswordUpdateForm, SignupForm, SnippetCreateForm};
use crate::session::Session;

/// Values every page needs, whatever it renders.
#[derive(Debug, Clone, Default)]
pub(crate) struct TemplateData {
    pub(crate) current_year: i32,
    pub(crate) flash: Option<String>,
    pub(crate) is_authenticated: bool,
    pub(crate) csrf_token: String,
}

/// Per-request view of the pipeline's state for page handlers.
pub(crate) struct RequestContext {
    pub(crate) session: Session,
    pub(crate) auth: AuthContext,
    csrf: Option<CsrfToken>,
}

impl RequestContext {
    /// Build the common template data. Consumes the pending flash message.
    pub(crate) async fn template_data(&self) -> Result<TemplateData, AppError> {
        Ok(TemplateData {
            current_year: Utc::now().year(),
            flash: self.session.pop_flash().await?,
            is_authenticated: self.auth.authenticated,
            csrf_token: self
                .csrf
                .as_ref()
                .map(|t| t.0.clone())
                .unwrap_or_default(),
        })
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self {
            session,
            auth: parts
                .extensions
                .get::<AuthContext>()
                .copied()
                .unwrap_or_default(),
            csrf: parts.extensions.get::<CsrfToken>().cloned(),
        })
    }
}

/// Render a page into a complete response, or fail before any byte is written.
pub(crate) fn render<T: Template>(status: StatusCode, template: &T) -> Result<Response, AppError> {
    let html = template.render()?;
    Ok((status, Html(html)).into_response())
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub(crate) struct HomeTemplate {
    pub(crate) data: TemplateData,
    pub(crate) snippets: Vec<Snippet>,
}

#[derive(Template)]
#[template(path = "pages/about.html")]
pub(crate) struct AboutTemplate {
    pub(crate) data: TemplateData,
}

#[derive(Template)]
#[template(path = "pages/view.html")]
pub(crate) struct ViewTemplate {
    pub(crate) data: TemplateData,
    pub(crate) snippet: Snippet,
}

#[derive(Template)]
#[template(path = "pages/create.html")]
pub(crate) struct CreateTemplate {
    pub(crate) data: TemplateData,
    pub(crate) form: SnippetCreateForm,
}

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub(crate) struct SignupTemplate {
    pub(crate) data: TemplateData,
    pub(crate) form: SignupForm,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub(crate) struct LoginTemplate {
    pub(crate) data: TemplateData,
    pub(crate) form: LoginForm,
}

#[derive(Template)]
#[template(path = "pages/account.html")]
pub(crate) struct AccountTemplate {
    pub(crate) data: TemplateData,
    pub(crate) user: User,
}

#[derive(Template)]
#[template(path = "pages/password.html")]
pub(crate) struct PasswordUpdateTemplate {
    pub(crate) data: TemplateData,
    pub(crate) form: PasswordUpdateForm,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn data() -> TemplateData {
        TemplateData {
            current_year: 2026,
            flash: Some("Saved <b>ok</b>".to_string()),
            is_authenticated: true,
            csrf_token: "tok123".to_string(),
        }
    }

    #[test]
    fn test_base_layout_renders_flash_escaped_and_csrf() {
        let html = AboutTemplate { data: data() }.render().unwrap();

        assert!(
            html.contains("Saved &#60;b&#62;ok&#60;/b&#62;")
                || html.contains("Saved &lt;b&gt;ok&lt;/b&gt;")
        );
        assert!(!html.contains("<b>ok</b>"));
        assert!(html.contains("<input type='hidden' name='csrf_token' value='tok123'>"));
        assert!(html.contains("2026"));
    }

    #[test]
    fn test_home_lists_snippets() {
        let now = Utc::now();
        let snippet = Snippet {
            id: 3,
            title: "An old silent pond".to_string(),
            content: "A frog jumps in".to_string(),
            created: now,
            expires: now + Duration::days(7),
        };
        let html = HomeTemplate {
            data: TemplateData::default(),
            snippets: vec![snippet],
        }
        .render()
        .unwrap();

        assert!(html.contains("/snippet/view/3"));
        assert!(html.contains("An old silent pond"));
    }

    #[test]
    fn test_home_without_snippets() {
        let html = HomeTemplate {
            data: TemplateData::default(),
            snippets: vec![],
        }
        .render()
        .unwrap();

        assert!(html.contains("There's nothing to see here... yet!"));
    }
}
