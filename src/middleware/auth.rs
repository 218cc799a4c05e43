use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::cookies;
use crate::repositories::{AuthSessionRepository, UserRepository};

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    /// The session token backing this login, needed for logout and for
    /// invalidating other sessions on password change.
    pub token: String,
}

#[derive(Clone)]
pub struct AuthLayerState {
    pub user_repo: UserRepository,
    pub auth_session_repo: AuthSessionRepository,
}

/// Resolve the session cookie into an `AuthUser` request extension.
/// Invalid or absent tokens simply leave the extension unset; the extractors
/// below decide whether that's a redirect.
pub async fn resolve_session(
    State(state): State<AuthLayerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = cookies::get_session_token(&jar) {
        if let Ok(Some(user_id)) = state.auth_session_repo.find_valid(&token).await {
            if let Ok(Some(user)) = state.user_repo.find_by_id(&user_id).await {
                request.extensions_mut().insert(AuthUser {
                    id: user.id,
                    username: user.username,
                    token,
                });
            }
        }
    }
    next.run(request).await
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthRedirect)
    }
}

pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/auth/login").into_response()
    }
}

// Optional auth - doesn't redirect, just returns None if not logged in
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}
