//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod order;
pub mod product;
pub mod session;
pub mod user;
