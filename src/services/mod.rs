//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and storage to fulfill application
//! use cases. Handlers reach them through the [`ServiceContainer`].

mod auth_service;
pub mod container;
mod order_service;
mod product_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Registration};
pub use order_service::{OrderDesk, OrderService, TrackingRequest};
pub use product_service::{Catalog, ProductService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
