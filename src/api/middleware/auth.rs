//! Session authentication middleware and extractors.
//!
//! `session_middleware` runs on every API route. It resolves the `sid`
//! cookie to a user and stores it in the request extensions; handlers then
//! pick it up with [`CurrentUser`], `Option<CurrentUser>` or [`AdminUser`].

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::session_cookie::SessionCookies;
use crate::api::AppState;
use crate::domain::{User, UserRole};
use crate::errors::AppError;

/// Authenticated user resolved from the session cookie.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Authenticated user that is also an admin.
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

/// Resolve the session cookie, if any, into request extensions.
///
/// Requests without a valid session pass through untouched; access rules
/// are enforced by the extractors.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(session_id) = SessionCookies::session_id(&jar) {
        if let Some(user) = state.auth_service.resolve_session(&session_id).await? {
            tracing::debug!(user_id = user.id, "Session resolved");
            request.extensions_mut().insert(CurrentUser(user));
        }
    }

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(&user)?;
        Ok(AdminUser(user))
    }
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &User) -> Result<(), AppError> {
    require_role(Some(user), UserRole::Admin)
}

/// Unauthorized without a user, Forbidden when the role differs.
pub fn require_role(user: Option<&User>, required: UserRole) -> Result<(), AppError> {
    match user {
        None => Err(AppError::Unauthorized),
        Some(user) if user.role == required => Ok(()),
        Some(_) => Err(AppError::Forbidden),
    }
}
