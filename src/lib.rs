//! Produce Market - backend for a produce-ordering marketplace
//!
//! Public catalog, checkout and order tracking for buyers, plus an admin
//! surface for inventory and order status. Sessions are cookie based.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities, validation and the cart
//! - **services**: Application use cases
//! - **infra**: Storage backends, migrations and bootstrap
//! - **notifications**: Customer e-mails
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server (in-memory storage unless DATABASE_URL is set)
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod notifications;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Cart, Order, OrderStatus, Product, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::{MemoryStorage, Storage};
