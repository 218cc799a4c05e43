use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::repositories::{AuthSessionRepository, UserRepository};
use crate::version::GIT_VERSION;

#[derive(Clone)]
pub struct ProfileState {
    pub user_repo: UserRepository,
    pub auth_session_repo: AuthSessionRepository,
}

#[derive(Template)]
#[template(path = "profile/index.html")]
struct ProfileTemplate {
    user: AuthUser,
    version: &'static str,
    error: Option<String>,
    message: Option<String>,
}

fn render_profile(
    user: AuthUser,
    error: Option<String>,
    message: Option<String>,
) -> Result<Response> {
    let template = ProfileTemplate {
        user,
        version: GIT_VERSION,
        error,
        message,
    };
    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}

pub async fn index(auth_user: AuthUser) -> Result<Response> {
    render_profile(auth_user, None, None)
}

#[derive(Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<ProfileState>,
    auth_user: AuthUser,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Response> {
    if form.new_password.len() < 6 {
        return render_profile(
            auth_user,
            Some("New password must be at least 6 characters".to_string()),
            None,
        );
    }

    let verified = state
        .user_repo
        .verify_password(&auth_user.username, &form.current_password)
        .await?;
    if verified.is_none() {
        return render_profile(
            auth_user,
            Some("Current password is incorrect".to_string()),
            None,
        );
    }

    state
        .user_repo
        .update_password(&auth_user.id, &form.new_password)
        .await?;

    // Other devices are signed out; the current session stays alive.
    state
        .auth_session_repo
        .delete_all_for_user_except(&auth_user.id, &auth_user.token)
        .await?;

    render_profile(auth_user, None, Some("Password updated".to_string()))
}
