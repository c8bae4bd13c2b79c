//! The `sid` session cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::config::{Config, SESSION_COOKIE_NAME};

/// Attributes applied to every session cookie this server issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookies {
    pub secure: bool,
    pub max_age: Duration,
}

impl SessionCookies {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secure: config.cookie_secure,
            max_age: Duration::seconds(config.session_ttl().num_seconds()),
        }
    }

    /// Session id carried by the request, if any.
    pub fn session_id(jar: &CookieJar) -> Option<String> {
        jar.get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Attach a session cookie to the response jar.
    pub fn set(&self, jar: CookieJar, session_id: String) -> CookieJar {
        jar.add(self.build(session_id, self.max_age))
    }

    /// Expire the session cookie on the client.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(String::new(), Duration::ZERO))
    }

    fn build(&self, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, value))
            .path("/")
            .max_age(max_age)
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}
