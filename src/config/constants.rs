//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Authentication & Sessions
// =============================================================================

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE_NAME: &str = "sid";

/// Default session lifetime in hours (7 days)
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 168;

/// Longest accepted session lifetime in hours (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 8_760;

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to new users
pub const ROLE_BUYER: &str = "buyer";

/// Administrator role with access to inventory and order management
pub const ROLE_ADMIN: &str = "admin";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_BUYER, ROLE_ADMIN];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

// =============================================================================
// Order Status
// =============================================================================

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_DELIVERED: &str = "delivered";

// =============================================================================
// Admin Bootstrap
// =============================================================================

/// Bootstrap admin credentials. Change immediately in any real deployment.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@agrofix.com";

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Prefix shared by every JSON endpoint
pub const API_PREFIX: &str = "/api";

// =============================================================================
// Database
// =============================================================================

/// Upper bound on pooled database connections
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Scale used for every persisted money column
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(10,2)` column holds (99,999,999.99), in cents
pub const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length, counted in characters
pub const MIN_PASSWORD_LENGTH: u64 = 6;

// =============================================================================
// Notifications
// =============================================================================

/// Sender used for order e-mails when SMTP_FROM is not set
pub const DEFAULT_SMTP_FROM: &str = "orders@agrofix.com";
