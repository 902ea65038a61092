mod account;
mod home;
mod snippet;
mod user;

pub(crate) use account::{PasswordUpdateForm, account_view, password_update, password_update_post};
pub(crate) use home::{about, home, ping};
pub(crate) use snippet::{SnippetCreateForm, snippet_create, snippet_create_post, snippet_view};
pub(crate) use user::{
    LoginForm, SignupForm, user_login, user_login_post, user_logout_post, user_signup,
    user_signup_post,
};
