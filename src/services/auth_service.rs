//! Authentication service - registration, login and server-side sessions.
//!
//! Password hashing lives in the domain `Password` value object; this
//! service only decides who may do what and manages session lifetimes.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::domain::password::{hash_password, verify_password};
use crate::domain::{NewUser, Password, Session, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::Storage;

/// Registration input after payload validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: UserRole,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account. Only an admin caller may create another admin.
    async fn register(&self, registration: Registration, caller: Option<User>) -> AppResult<User>;

    /// Verify credentials and open a session.
    async fn login(&self, username: &str, password: &str) -> AppResult<(User, Session)>;

    /// Drop a server-side session. Unknown ids are ignored.
    async fn logout(&self, session_id: &str) -> AppResult<()>;

    /// The user behind a live session, if any. Expired sessions are removed.
    async fn resolve_session(&self, session_id: &str) -> AppResult<Option<User>>;
}

/// A real argon2 hash verified for unknown usernames so that a miss costs
/// the same as a wrong password.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("timing-equalizer").unwrap_or_default())
}

/// Run argon2 work on the blocking pool so it does not stall request tasks.
async fn off_executor<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::internal(format!("password task failed: {}", e)))
}

/// Concrete implementation of AuthService backed by [`Storage`].
pub struct Authenticator {
    storage: Arc<dyn Storage>,
    session_ttl: Duration,
}

impl Authenticator {
    pub fn new(storage: Arc<dyn Storage>, session_ttl: Duration) -> Self {
        Self {
            storage,
            session_ttl,
        }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, registration: Registration, caller: Option<User>) -> AppResult<User> {
        if registration.role.is_admin() && !caller.as_ref().is_some_and(User::is_admin) {
            return Err(AppError::Forbidden);
        }

        if self
            .storage
            .get_user_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Username"));
        }

        let plain_text = registration.password;
        let password_hash = off_executor(move || Password::new(&plain_text))
            .await??
            .into_string();

        // The storage uniqueness check still guards the race between lookup and insert
        let user = self
            .storage
            .create_user(NewUser {
                username: registration.username,
                password_hash,
                email: registration.email,
                role: registration.role,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> AppResult<(User, Session)> {
        let user = self.storage.get_user_by_username(username).await?;

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| dummy_hash().to_string());
        let candidate = password.to_owned();
        let password_valid =
            off_executor(move || verify_password(&candidate, &stored_hash)).await?;

        let user = match user {
            Some(user) if password_valid => user,
            _ => {
                tracing::debug!(%username, "Rejected login");
                return Err(AppError::InvalidCredentials);
            }
        };

        let session = Session::new(user.id, self.session_ttl);
        self.storage.create_session(session.clone()).await?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok((user, session))
    }

    async fn logout(&self, session_id: &str) -> AppResult<()> {
        self.storage.delete_session(session_id).await?;
        Ok(())
    }

    async fn resolve_session(&self, session_id: &str) -> AppResult<Option<User>> {
        let Some(session) = self.storage.get_session(session_id).await? else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            self.storage.delete_session(session_id).await?;
            return Ok(None);
        }

        self.storage.get_user_by_id(session.user_id).await
    }
}
