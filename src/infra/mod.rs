//! Infrastructure layer - External systems integration
//!
//! - Database connection and migrations
//! - Storage backends (in-memory and PostgreSQL)
//! - First-run bootstrap

pub mod bootstrap;
pub mod db;
pub mod repositories;

use std::sync::Arc;

pub use db::{Database, Migrator};
pub use repositories::{MemoryStorage, SqlStorage, Storage};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockStorage;

use crate::config::Config;
use crate::errors::AppResult;

/// Pick the storage backend for this process.
///
/// With `DATABASE_URL` set, connects and migrates; any failure aborts
/// startup instead of falling back to memory.
pub async fn connect_storage(config: &Config) -> AppResult<Arc<dyn Storage>> {
    match config.database_url.as_deref() {
        Some(url) => {
            let database = Database::connect(url, config.db_max_connections).await?;
            Ok(Arc::new(SqlStorage::new(database)))
        }
        None => {
            tracing::warn!("Using in-memory storage; all data is lost on restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}
