//! Server-side login session.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};

/// Random bytes behind each session id (hex-encoded on the wire)
const SESSION_ID_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for `user_id` with a fresh unguessable id.
    pub fn new(user_id: i32, ttl: Duration) -> Self {
        let created_at = Utc::now();
        Self {
            id: generate_id(),
            user_id,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

fn generate_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
