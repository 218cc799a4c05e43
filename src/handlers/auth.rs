use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;

use crate::cookies;
use crate::error::{AppError, Result};
use crate::middleware::auth::OptionalAuthUser;
use crate::models::{CreateUser, LoginCredentials};
use crate::repositories::{AuthSessionRepository, UserRepository};

#[derive(Clone)]
pub struct AuthState {
    pub user_repo: UserRepository,
    pub auth_session_repo: AuthSessionRepository,
}

// Templates
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "auth/register.html")]
struct RegisterTemplate {
    error: Option<String>,
}

fn render_login(error: Option<String>) -> Result<Response> {
    let template = LoginTemplate { error };
    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}

fn render_register(error: Option<String>) -> Result<Response> {
    let template = RegisterTemplate { error };
    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}

// Handlers
pub async fn login_page(OptionalAuthUser(auth_user): OptionalAuthUser) -> Result<Response> {
    // Already logged in
    if auth_user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render_login(None)
}

pub async fn login_submit(
    State(state): State<AuthState>,
    jar: CookieJar,
    Form(credentials): Form<LoginCredentials>,
) -> Result<Response> {
    let user = state
        .user_repo
        .verify_password(&credentials.username, &credentials.password)
        .await?;

    match user {
        Some(user) => {
            let token = state.auth_session_repo.create(&user.id).await?;
            let jar = jar.add(cookies::create_session_cookie(&token));
            Ok((jar, Redirect::to("/")).into_response())
        }
        None => render_login(Some("Invalid username or password".to_string())),
    }
}

pub async fn register_page(OptionalAuthUser(auth_user): OptionalAuthUser) -> Result<Response> {
    if auth_user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render_register(None)
}

pub async fn register_submit(
    State(state): State<AuthState>,
    jar: CookieJar,
    Form(form): Form<CreateUser>,
) -> Result<Response> {
    let username = form.username.trim();
    if username.is_empty() {
        return render_register(Some("Username is required".to_string()));
    }
    if form.password.len() < 6 {
        return render_register(Some("Password must be at least 6 characters".to_string()));
    }
    if state.user_repo.find_by_username(username).await?.is_some() {
        return render_register(Some("Username already taken".to_string()));
    }

    let user = state.user_repo.create(username, &form.password).await?;

    // Auto login
    let token = state.auth_session_repo.create(&user.id).await?;
    let jar = jar.add(cookies::create_session_cookie(&token));

    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> Result<Response> {
    if let Some(token) = cookies::get_session_token(&jar) {
        state.auth_session_repo.delete(&token).await?;
    }
    let jar = jar.add(cookies::remove_session_cookie());
    Ok((jar, Redirect::to("/auth/login")).into_response())
}
