use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use http::StatusCode;
use serde::Deserialize;

use snippetbox::UserError;
use snippetbox::validator::{EMAIL_RX, Validator, matches, min_chars, not_blank};

use crate::error::AppError;
use crate::middleware::LOGIN_PATH;
use crate::state::AppState;
use crate::templates::{LoginTemplate, RequestContext, SignupTemplate, render};

const DEFAULT_AFTER_LOGIN: &str = "/snippet/create";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SignupForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password: String,
    #[serde(skip)]
    pub(crate) validator: Validator,
}

impl SignupForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.name), "name", "This field cannot be blank");
        v.check_field(not_blank(&self.email), "email", "This field cannot be blank");
        v.check_field(
            matches(&self.email, &EMAIL_RX),
            "email",
            "This field must be a valid email address",
        );
        v.check_field(not_blank(&self.password), "password", "This field cannot be blank");
        v.check_field(
            min_chars(&self.password, 8),
            "password",
            "This field must be at least 8 characters long",
        );
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginForm {
    pub(crate) email: String,
    pub(crate) password: String,
    #[serde(skip)]
    pub(crate) validator: Validator,
}

impl LoginForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.email), "email", "This field cannot be blank");
        v.check_field(
            matches(&self.email, &EMAIL_RX),
            "email",
            "This field must be a valid email address",
        );
        v.check_field(not_blank(&self.password), "password", "This field cannot be blank");
    }
}

fn decode<T>(form: Result<Form<T>, FormRejection>) -> Result<T, AppError> {
    form.map(|Form(f)| f).map_err(|e| {
        tracing::debug!("Rejected form: {}", e);
        AppError::BadRequest
    })
}

pub(crate) async fn user_signup(ctx: RequestContext) -> Result<Response, AppError> {
    render(
        StatusCode::OK,
        &SignupTemplate {
            data: ctx.template_data().await?,
            form: SignupForm::default(),
        },
    )
}

pub(crate) async fn user_signup_post(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<SignupForm>, FormRejection>,
) -> Result<Response, AppError> {
    let mut form = decode(form)?;

    form.validate();
    if form.validator.valid() {
        match state
            .users
            .insert(&form.name, &form.email, &form.password)
            .await
        {
            Ok(_) => {
                ctx.session
                    .put_flash("Your signup was successful. Please log in.")
                    .await;
                return Ok(Redirect::to(LOGIN_PATH).into_response());
            }
            Err(UserError::DuplicateEmail) => {
                form.validator
                    .add_field_error("email", "Email address is already in use");
            }
            Err(e) => return Err(e.into()),
        }
    }

    form.password.clear();
    render(
        StatusCode::UNPROCESSABLE_ENTITY,
        &SignupTemplate {
            data: ctx.template_data().await?,
            form,
        },
    )
}

pub(crate) async fn user_login(ctx: RequestContext) -> Result<Response, AppError> {
    render(
        StatusCode::OK,
        &LoginTemplate {
            data: ctx.template_data().await?,
            form: LoginForm::default(),
        },
    )
}

pub(crate) async fn user_login_post(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let mut form = decode(form)?;

    form.validate();
    if form.validator.valid() {
        match state.users.authenticate(&form.email, &form.password).await {
            Ok(user_id) => {
                ctx.session.login(user_id).await?;
                let target = ctx
                    .session
                    .pop_redirect_after_login()
                    .await
                    .unwrap_or_else(|| DEFAULT_AFTER_LOGIN.to_string());
                tracing::info!(user_id, "User logged in");
                return Ok(Redirect::to(&target).into_response());
            }
            Err(UserError::InvalidCredentials) => {
                form.validator
                    .add_non_field_error("Email or password is incorrect");
            }
            Err(e) => return Err(e.into()),
        }
    }

    form.password.clear();
    render(
        StatusCode::UNPROCESSABLE_ENTITY,
        &LoginTemplate {
            data: ctx.template_data().await?,
            form,
        },
    )
}

pub(crate) async fn user_logout_post(ctx: RequestContext) -> Result<Response, AppError> {
    ctx.session.logout().await?;
    ctx.session
        .put_flash("You've been logged out successfully!")
        .await;
    tracing::info!(user_id = ?ctx.auth.user_id, "User logged out");
    Ok(Redirect::to("/").into_response())
}
