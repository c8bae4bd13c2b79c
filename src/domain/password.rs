//! Password value object - Domain layer password handling.
//!
//! Hashes with Argon2id (memory-hard). The PHC string produced by the
//! hasher embeds the per-password random salt, so one column holds both.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns validation error if password is too short.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let hash = hash_password(plain_text)?;
        Ok(Self { hash })
    }

    /// Create a Password from an existing hash (from storage).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        verify_password(plain_text, &self.hash)
    }
}

/// Hash a password with a fresh random salt.
pub fn hash_password(plain_text: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()
        .hash_password(plain_text.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Recompute the hash with the stored salt and compare.
///
/// A malformed stored hash never verifies.
pub fn verify_password(plain_text: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

#[inline]
fn argon2() -> Argon2<'static> {
    Argon2::default()
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}
