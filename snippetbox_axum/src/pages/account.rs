use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use http::StatusCode;
use serde::Deserialize;

use snippetbox::UserError;
use snippetbox::validator::{Validator, min_chars, not_blank};

use crate::error::AppError;
use crate::middleware::LOGIN_PATH;
use crate::state::AppState;
use crate::templates::{AccountTemplate, PasswordUpdateTemplate, RequestContext, render};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PasswordUpdateForm {
    #[serde(rename = "currentPassword")]
    pub(crate) current_password: String,
    #[serde(rename = "newPassword")]
    pub(crate) new_password: String,
    #[serde(rename = "newPasswordConfirmation")]
    pub(crate) new_password_confirmation: String,
    #[serde(skip)]
    pub(crate) validator: Validator,
}

impl PasswordUpdateForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(
            not_blank(&self.current_password),
            "currentPassword",
            "This field cannot be blank",
        );
        v.check_field(
            not_blank(&self.new_password),
            "newPassword",
            "This field cannot be blank",
        );
        v.check_field(
            min_chars(&self.new_password, 8),
            "newPassword",
            "This field must be at least 8 characters long",
        );
        v.check_field(
            not_blank(&self.new_password_confirmation),
            "newPasswordConfirmation",
            "This field cannot be blank",
        );
        v.check_field(
            self.new_password == self.new_password_confirmation,
            "newPasswordConfirmation",
            "Passwords do not match",
        );
    }

    fn clear_secrets(&mut self) {
        self.current_password.clear();
        self.new_password.clear();
        self.new_password_confirmation.clear();
    }
}

/// The gate guarantees an authenticated context; this only guards misuse.
fn current_user(ctx: &RequestContext) -> Result<i64, AppError> {
    ctx.auth
        .user_id
        .ok_or_else(|| AppError::ServerError("No user on a protected route".to_string()))
}

pub(crate) async fn account_view(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let user = match state.users.get(current_user(&ctx)?).await {
        Ok(user) => user,
        Err(UserError::NotFound) => return Ok(Redirect::to(LOGIN_PATH).into_response()),
        Err(e) => return Err(e.into()),
    };

    render(
        StatusCode::OK,
        &AccountTemplate {
            data: ctx.template_data().await?,
            user,
        },
    )
}

pub(crate) async fn password_update(ctx: RequestContext) -> Result<Response, AppError> {
    render(
        StatusCode::OK,
        &PasswordUpdateTemplate {
            data: ctx.template_data().await?,
            form: PasswordUpdateForm::default(),
        },
    )
}

pub(crate) async fn password_update_post(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<PasswordUpdateForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(mut form) = form.map_err(|e| {
        tracing::debug!("Rejected password form: {}", e);
        AppError::BadRequest
    })?;
    let user_id = current_user(&ctx)?;

    form.validate();
    if form.validator.valid() {
        match state
            .users
            .password_update(user_id, &form.current_password, &form.new_password)
            .await
        {
            Ok(()) => {
                ctx.session.put_flash("Your password has been updated!").await;
                return Ok(Redirect::to("/account/view").into_response());
            }
            Err(UserError::InvalidCredentials) => {
                form.validator
                    .add_field_error("currentPassword", "Current password is incorrect");
            }
            Err(e) => return Err(e.into()),
        }
    }

    form.clear_secrets();
    render(
        StatusCode::UNPROCESSABLE_ENTITY,
        &PasswordUpdateTemplate {
            data: ctx.template_data().await?,
            form,
        },
    )
}
