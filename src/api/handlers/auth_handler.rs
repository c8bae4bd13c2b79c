//! Authentication handlers.

use axum::{extract::State, response::Json, routing::{get, post}, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::session_cookie::SessionCookies;
use crate::api::AppState;
use crate::config::ROLE_BUYER;
use crate::domain::validation::known_role;
use crate::domain::{UserResponse, UserRole};
use crate::errors::AppResult;
use crate::services::Registration;
use crate::types::{Created, MessageResponse};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    #[schema(example = "alice", min_length = 3)]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "password1", min_length = 6)]
    pub password: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// `buyer` (default) or `admin`; admin accounts can only be created by an admin
    #[serde(default)]
    #[validate(custom(function = "known_role"))]
    #[schema(example = "buyer")]
    pub role: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "password1")]
    pub password: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Only admins may create admin accounts"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<UserResponse>> {
    let role = UserRole::from(payload.role.as_deref().unwrap_or(ROLE_BUYER));

    let user = state
        .auth_service
        .register(
            Registration {
                username: payload.username,
                password: payload.password,
                email: payload.email,
                role,
            },
            caller.map(|CurrentUser(user)| user),
        )
        .await?;

    Ok(Created(UserResponse::from(user)))
}

/// Log in and receive a session cookie
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; `sid` cookie set", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<UserResponse>)> {
    let (user, session) = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    let jar = state.cookies.set(jar, session.id);
    Ok((jar, Json(UserResponse::from(user))))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Session ended and cookie cleared", body = MessageResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    if let Some(session_id) = SessionCookies::session_id(&jar) {
        state.auth_service.logout(&session_id).await?;
    }

    let jar = state.cookies.clear(jar);
    Ok((jar, Json(MessageResponse::new("Logged out"))))
}

/// The user behind the current session
#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "No active session")
    ),
    security(("session_cookie" = []))
)]
pub async fn session(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
