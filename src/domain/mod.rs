//! Domain layer - Core business entities and logic
//!
//! This module contains the marketplace models (users, catalog products,
//! orders, carts and sessions) independent of storage and transport.

pub mod cart;
pub mod money;
pub mod order;
pub mod password;
pub mod product;
pub mod session;
pub mod user;
pub mod validation;

pub use cart::{Cart, CustomerDetails};
pub use order::{NewOrder, Order, OrderDraft, OrderFilter, OrderItem, OrderStatus};
pub use password::Password;
pub use product::{Product, ProductInput};
pub use session::Session;
pub use user::{NewUser, User, UserResponse, UserRole};
