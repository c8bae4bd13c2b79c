//! Repository layer - Data access abstraction
//!
//! One `Storage` trait covers users, catalog, orders and sessions. Two
//! backends implement it: an in-process `MemoryStorage` for development and
//! `SqlStorage` over PostgreSQL. The backend is chosen once at startup and
//! shared as `Arc<dyn Storage>`.

pub(crate) mod entities;
mod memory;
mod sql;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewOrder, NewUser, Order, OrderStatus, Product, ProductInput, Session, User};
use crate::errors::AppResult;

pub use memory::MemoryStorage;
pub use sql::SqlStorage;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Persistence contract for the marketplace.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    // Users

    /// Insert a user. Conflict if the username is taken.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    /// Insert unless the username exists. Returns whether a row was created.
    async fn ensure_user(&self, user: NewUser) -> AppResult<bool>;

    async fn get_user_by_id(&self, id: i32) -> AppResult<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    // Catalog

    /// All products, ascending by id.
    async fn get_all_products(&self) -> AppResult<Vec<Product>>;

    async fn get_product_by_id(&self, id: i32) -> AppResult<Option<Product>>;

    async fn create_product(&self, input: ProductInput) -> AppResult<Product>;

    async fn update_product(&self, id: i32, input: ProductInput) -> AppResult<Option<Product>>;

    /// Returns whether a product was removed.
    async fn delete_product(&self, id: i32) -> AppResult<bool>;

    // Orders

    /// All orders, newest first.
    async fn get_all_orders(&self) -> AppResult<Vec<Order>>;

    /// Orders placed by one user, newest first.
    async fn get_orders_by_user_id(&self, user_id: i32) -> AppResult<Vec<Order>>;

    async fn get_order_by_id(&self, id: i32) -> AppResult<Option<Order>>;

    /// Persist an order with a fresh id, `pending` status and the current time.
    async fn create_order(&self, order: NewOrder) -> AppResult<Order>;

    /// Overwrite the status. No transition rules are applied here.
    async fn update_order_status(&self, id: i32, status: OrderStatus)
        -> AppResult<Option<Order>>;

    /// Set the status only if the stored one is a predecessor of `status`,
    /// checked and written atomically. `None` if the order is missing or
    /// was not behind `status`.
    async fn advance_order_status(&self, id: i32, status: OrderStatus)
        -> AppResult<Option<Order>>;

    async fn mark_order_as_notified(&self, id: i32) -> AppResult<bool>;

    // Sessions

    async fn create_session(&self, session: Session) -> AppResult<()>;

    async fn get_session(&self, id: &str) -> AppResult<Option<Session>>;

    async fn delete_session(&self, id: &str) -> AppResult<bool>;

    /// Remove sessions that expired at or before `now`. Returns the count.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<u64>;

    // Health

    async fn ping(&self) -> AppResult<()>;

    fn backend_name(&self) -> &'static str;
}
