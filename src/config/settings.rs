//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME,
    DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SESSION_TTL_HOURS, DEFAULT_SMTP_FROM, MAX_SESSION_TTL_HOURS,
};

/// Credentials for the account created on first run.
#[derive(Clone)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Relational backend connection string; `None` selects in-memory storage
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub admin: AdminAccount,
    pub smtp_host: Option<String>,
    pub smtp_from: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("db_max_connections", &self.db_max_connections)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("cookie_secure", &self.cookie_secure)
            .field("admin_username", &self.admin.username)
            .field("admin_password", &"[REDACTED]")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_from", &self.smtp_from)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            cookie_secure: false,
            admin: AdminAccount {
                username: DEFAULT_ADMIN_USERNAME.to_string(),
                password: DEFAULT_ADMIN_PASSWORD.to_string(),
                email: DEFAULT_ADMIN_EMAIL.to_string(),
            },
            smtp_host: None,
            smtp_from: DEFAULT_SMTP_FROM.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let admin = AdminAccount {
            username: env::var("ADMIN_USERNAME").unwrap_or(defaults.admin.username),
            password: env::var("ADMIN_PASSWORD").unwrap_or(defaults.admin.password),
            email: env::var("ADMIN_EMAIL").unwrap_or(defaults.admin.email),
        };

        Self {
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS")
                .unwrap_or(defaults.db_max_connections),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            session_ttl_hours: session_ttl_hours(parse_var("SESSION_TTL_HOURS")),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.cookie_secure),
            admin,
            smtp_host: env::var("SMTP_HOST").ok().filter(|v| !v.is_empty()),
            smtp_from: env::var("SMTP_FROM").unwrap_or(defaults.smtp_from),
        }
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Session lifetime as a chrono duration, kept within 1 hour and
    /// `MAX_SESSION_TTL_HOURS`.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }
}

fn session_ttl_hours(raw: Option<i64>) -> i64 {
    match raw {
        None => DEFAULT_SESSION_TTL_HOURS,
        Some(hours) if hours < 1 => {
            tracing::warn!(hours, "SESSION_TTL_HOURS must be positive, using the default");
            DEFAULT_SESSION_TTL_HOURS
        }
        Some(hours) if hours > MAX_SESSION_TTL_HOURS => {
            tracing::warn!(hours, max = MAX_SESSION_TTL_HOURS, "SESSION_TTL_HOURS too large, capping");
            MAX_SESSION_TTL_HOURS
        }
        Some(hours) => hours,
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
