//! Outbound customer notifications.

mod email;

use async_trait::async_trait;

use crate::domain::Order;
use crate::errors::AppResult;

pub use email::{EmailMessage, EmailNotifier};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Tells a customer that something happened to their order.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Called after an order's status was changed by an admin.
    async fn order_status_changed(&self, order: &Order) -> AppResult<()>;
}
