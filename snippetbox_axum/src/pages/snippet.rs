use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use http::StatusCode;
use serde::Deserialize;

use snippetbox::validator::{Validator, max_chars, not_blank, permitted_value};

use crate::error::AppError;
use crate::state::AppState;
use crate::templates::{CreateTemplate, RequestContext, ViewTemplate, render};

const PERMITTED_EXPIRES: [i64; 3] = [1, 7, 365];

/// `expires` has no serde default: a missing or non-integer value is a 400.
/// The 365-day preselection only applies to the empty form.
#[derive(Debug, Deserialize)]
pub(crate) struct SnippetCreateForm {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) content: String,
    pub(crate) expires: i64,
    #[serde(skip)]
    pub(crate) validator: Validator,
}

impl Default for SnippetCreateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: 365,
            validator: Validator::default(),
        }
    }
}

impl SnippetCreateForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.title), "title", "This field cannot be blank");
        v.check_field(
            max_chars(&self.title, 100),
            "title",
            "This field cannot be more than 100 characters long",
        );
        v.check_field(not_blank(&self.content), "content", "This field cannot be blank");
        v.check_field(
            permitted_value(&self.expires, &PERMITTED_EXPIRES),
            "expires",
            "This field must equal 1, 7 or 365",
        );
    }
}

pub(crate) async fn snippet_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let id = match id.parse::<i64>() {
        Ok(id) if id >= 1 => id,
        _ => return Err(AppError::NotFound),
    };

    let snippet = state.snippets.get(id).await?;
    render(
        StatusCode::OK,
        &ViewTemplate {
            data: ctx.template_data().await?,
            snippet,
        },
    )
}

pub(crate) async fn snippet_create(ctx: RequestContext) -> Result<Response, AppError> {
    render(
        StatusCode::OK,
        &CreateTemplate {
            data: ctx.template_data().await?,
            form: SnippetCreateForm::default(),
        },
    )
}

pub(crate) async fn snippet_create_post(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<SnippetCreateForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(mut form) = form.map_err(|e| {
        tracing::debug!("Rejected snippet form: {}", e);
        AppError::BadRequest
    })?;

    form.validate();
    if !form.validator.valid() {
        return render(
            StatusCode::UNPROCESSABLE_ENTITY,
            &CreateTemplate {
                data: ctx.template_data().await?,
                form,
            },
        );
    }

    let id = state
        .snippets
        .insert(&form.title, &form.content, form.expires)
        .await?;

    ctx.session.put_flash("Snippet successfully created!").await;
    Ok(Redirect::to(&format!("/snippet/view/{id}")).into_response())
}
