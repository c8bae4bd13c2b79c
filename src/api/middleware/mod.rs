//! API middleware.

mod auth;

pub use auth::{require_admin, require_role, session_middleware, AdminUser, CurrentUser};
