//! Order workflow: placement, tracking and status changes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::validation::validate;
use crate::domain::{Order, OrderDraft, OrderFilter, OrderStatus, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::Storage;
use crate::notifications::Notifier;

/// Who is asking to see an order.
#[derive(Debug, Clone, Default)]
pub struct TrackingRequest {
    pub viewer: Option<User>,
    pub email: Option<String>,
}

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Validate a checkout payload and persist it as a pending order.
    async fn place_order(&self, draft: OrderDraft, user_id: Option<i32>) -> AppResult<Order>;

    /// Admin listing, newest first.
    async fn list_orders(&self, filter: OrderFilter) -> AppResult<Vec<Order>>;

    async fn orders_for_user(&self, user_id: i32) -> AppResult<Vec<Order>>;

    /// Fetch an order for an admin, its owner, or someone who knows the
    /// customer e-mail. Everyone else gets `NotFound`.
    async fn track_order(&self, id: i32, request: TrackingRequest) -> AppResult<Order>;

    /// Move an order forward in its lifecycle and notify the customer.
    async fn update_status(&self, id: i32, status: OrderStatus) -> AppResult<Order>;
}

pub struct OrderDesk {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
}

impl OrderDesk {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Self {
        Self { storage, notifier }
    }

    async fn notify(&self, order: &Order) {
        match self.notifier.order_status_changed(order).await {
            Ok(()) => {
                if let Err(e) = self.storage.mark_order_as_notified(order.id).await {
                    tracing::warn!(order_id = order.id, error = %e, "Failed to flag order as notified");
                }
            }
            Err(e) => {
                tracing::warn!(order_id = order.id, error = %e, "Order notification failed");
            }
        }
    }
}

fn may_view(order: &Order, request: &TrackingRequest) -> bool {
    if let Some(viewer) = &request.viewer {
        if viewer.is_admin() || order.is_owned_by(viewer.id) {
            return true;
        }
    }

    request
        .email
        .as_deref()
        .is_some_and(|email| email.trim().eq_ignore_ascii_case(&order.customer_email))
}

#[async_trait]
impl OrderService for OrderDesk {
    async fn place_order(&self, draft: OrderDraft, user_id: Option<i32>) -> AppResult<Order> {
        validate(&draft)?;
        draft.check_totals().map_err(AppError::InvalidFields)?;

        let order = self
            .storage
            .create_order(draft.into_new_order(user_id))
            .await?;

        tracing::info!(
            order_id = order.id,
            user_id = ?order.user_id,
            total = %order.total_amount,
            "Order placed"
        );
        Ok(order)
    }

    async fn list_orders(&self, filter: OrderFilter) -> AppResult<Vec<Order>> {
        let orders = self.storage.get_all_orders().await?;
        Ok(orders.into_iter().filter(|o| filter.matches(o)).collect())
    }

    async fn orders_for_user(&self, user_id: i32) -> AppResult<Vec<Order>> {
        self.storage.get_orders_by_user_id(user_id).await
    }

    async fn track_order(&self, id: i32, request: TrackingRequest) -> AppResult<Order> {
        let order = self.storage.get_order_by_id(id).await?.ok_or_not_found()?;

        if !may_view(&order, &request) {
            return Err(AppError::NotFound);
        }
        Ok(order)
    }

    async fn update_status(&self, id: i32, status: OrderStatus) -> AppResult<Order> {
        let current = self.storage.get_order_by_id(id).await?.ok_or_not_found()?;

        if current.status == status {
            return Ok(current);
        }
        if !current.status.can_transition_to(status) {
            return Err(AppError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let Some(order) = self.storage.advance_order_status(id, status).await? else {
            // Another update got there first; report against what it left behind
            let latest = self.storage.get_order_by_id(id).await?.ok_or_not_found()?;
            if latest.status == status {
                return Ok(latest);
            }
            return Err(AppError::InvalidTransition {
                from: latest.status,
                to: status,
            });
        };

        tracing::info!(order_id = id, from = %current.status, to = %status, "Order status changed");
        self.notify(&order).await;

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{NewOrder, OrderItem, UserRole};
    use crate::infra::MockStorage;
    use crate::notifications::MockNotifier;

    fn item() -> OrderItem {
        OrderItem {
            product_id: 1,
            product_name: "Fresh Tomatoes".to_string(),
            price: Decimal::from(45),
            quantity: 2,
            total: Decimal::from(90),
            image_url: None,
        }
    }

    fn draft() -> OrderDraft {
        OrderDraft {
            customer_name: "Asha".to_string(),
            customer_email: "asha@example.com".to_string(),
            customer_phone: "9876543210".to_string(),
            delivery_address: "12 Market Road".to_string(),
            delivery_city: "Pune".to_string(),
            delivery_pincode: "411001".to_string(),
            total_amount: Decimal::from(90),
            items: vec![item()],
        }
    }

    fn stored(id: i32, user_id: Option<i32>, status: OrderStatus) -> Order {
        let mut order = Order::place(id, draft().into_new_order(user_id), Utc::now());
        order.status = status;
        order
    }

    fn user(id: i32, role: UserRole) -> User {
        User {
            id,
            username: format!("user{}", id),
            password_hash: "hash".to_string(),
            email: format!("user{}@example.com", id),
            role,
            created_at: Utc::now(),
        }
    }

    fn desk(storage: MockStorage, notifier: MockNotifier) -> OrderDesk {
        OrderDesk::new(Arc::new(storage), Arc::new(notifier))
    }

    #[tokio::test]
    async fn test_place_order_attaches_user() {
        let mut storage = MockStorage::new();
        storage
            .expect_create_order()
            .withf(|new: &NewOrder| new.user_id == Some(7) && new.items.len() == 1)
            .times(1)
            .returning(|new| Ok(Order::place(1, new, Utc::now())));

        let service = desk(storage, MockNotifier::new());
        let order = service.place_order(draft(), Some(7)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.user_id, Some(7));
    }

    #[tokio::test]
    async fn test_tampered_totals_are_rejected() {
        let mut storage = MockStorage::new();
        storage.expect_create_order().never();

        let mut tampered = draft();
        tampered.items[0].total = Decimal::from(1);
        tampered.total_amount = Decimal::from(1);

        let service = desk(storage, MockNotifier::new());
        match service.place_order(tampered, None).await {
            Err(AppError::InvalidFields(fields)) => {
                assert_eq!(fields[0].field, "items[0].total");
            }
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_change_notifies_and_flags() {
        let mut storage = MockStorage::new();
        storage
            .expect_get_order_by_id()
            .with(eq(3))
            .returning(|id| Ok(Some(stored(id, None, OrderStatus::Pending))));
        storage
            .expect_advance_order_status()
            .with(eq(3), eq(OrderStatus::InProgress))
            .times(1)
            .returning(|id, status| Ok(Some(stored(id, None, status))));
        storage
            .expect_mark_order_as_notified()
            .with(eq(3))
            .times(1)
            .returning(|_| Ok(true));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_order_status_changed()
            .times(1)
            .returning(|_| Ok(()));

        let order = desk(storage, notifier)
            .update_status(3, OrderStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);
    }

    #[tokio::test]
    async fn test_failed_notification_does_not_fail_update() {
        let mut storage = MockStorage::new();
        storage
            .expect_get_order_by_id()
            .returning(|id| Ok(Some(stored(id, None, OrderStatus::InProgress))));
        storage
            .expect_advance_order_status()
            .returning(|id, status| Ok(Some(stored(id, None, status))));
        storage.expect_mark_order_as_notified().never();

        let mut notifier = MockNotifier::new();
        notifier
            .expect_order_status_changed()
            .returning(|_| Err(AppError::internal("smtp down")));

        let order = desk(storage, notifier)
            .update_status(5, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_backward_transition_is_rejected() {
        let mut storage = MockStorage::new();
        storage
            .expect_get_order_by_id()
            .returning(|id| Ok(Some(stored(id, None, OrderStatus::Delivered))));
        storage.expect_advance_order_status().never();

        let result = desk(storage, MockNotifier::new())
            .update_status(5, OrderStatus::Pending)
            .await;
        assert!(matches!(
            result,
            Err(AppError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending
            })
        ));
    }

    #[tokio::test]
    async fn test_same_status_is_a_no_op() {
        let mut storage = MockStorage::new();
        storage
            .expect_get_order_by_id()
            .returning(|id| Ok(Some(stored(id, None, OrderStatus::InProgress))));
        storage.expect_advance_order_status().never();

        let mut notifier = MockNotifier::new();
        notifier.expect_order_status_changed().never();

        let order = desk(storage, notifier)
            .update_status(5, OrderStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);
    }

    #[tokio::test]
    async fn test_lost_race_to_later_status_is_rejected() {
        let mut storage = MockStorage::new();
        let mut reads = 0;
        storage.expect_get_order_by_id().times(2).returning(move |id| {
            reads += 1;
            let status = if reads == 1 {
                OrderStatus::Pending
            } else {
                OrderStatus::Delivered
            };
            Ok(Some(stored(id, None, status)))
        });
        storage
            .expect_advance_order_status()
            .with(eq(6), eq(OrderStatus::InProgress))
            .times(1)
            .returning(|_, _| Ok(None));

        let mut notifier = MockNotifier::new();
        notifier.expect_order_status_changed().never();

        let result = desk(storage, notifier)
            .update_status(6, OrderStatus::InProgress)
            .await;
        assert!(matches!(
            result,
            Err(AppError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::InProgress
            })
        ));
    }

    #[tokio::test]
    async fn test_lost_race_to_same_status_is_a_no_op() {
        let mut storage = MockStorage::new();
        let mut reads = 0;
        storage.expect_get_order_by_id().times(2).returning(move |id| {
            reads += 1;
            let status = if reads == 1 {
                OrderStatus::Pending
            } else {
                OrderStatus::Delivered
            };
            Ok(Some(stored(id, None, status)))
        });
        storage
            .expect_advance_order_status()
            .returning(|_, _| Ok(None));

        let mut notifier = MockNotifier::new();
        notifier.expect_order_status_changed().never();

        let order = desk(storage, notifier)
            .update_status(6, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_unknown_order_status_update_is_not_found() {
        let mut storage = MockStorage::new();
        storage.expect_get_order_by_id().returning(|_| Ok(None));

        let result = desk(storage, MockNotifier::new())
            .update_status(99, OrderStatus::Delivered)
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_tracking_access_rules() {
        let mut storage = MockStorage::new();
        storage
            .expect_get_order_by_id()
            .returning(|id| Ok(Some(stored(id, Some(7), OrderStatus::Pending))));
        let service = desk(storage, MockNotifier::new());

        let owner = TrackingRequest { viewer: Some(user(7, UserRole::Buyer)), email: None };
        let admin = TrackingRequest { viewer: Some(user(1, UserRole::Admin)), email: None };
        let by_email = TrackingRequest { viewer: None, email: Some("ASHA@example.com".to_string()) };
        let stranger = TrackingRequest { viewer: Some(user(8, UserRole::Buyer)), email: None };
        let wrong_email = TrackingRequest { viewer: None, email: Some("eve@example.com".to_string()) };

        assert!(service.track_order(4, owner).await.is_ok());
        assert!(service.track_order(4, admin).await.is_ok());
        assert!(service.track_order(4, by_email).await.is_ok());
        assert!(matches!(service.track_order(4, stranger).await, Err(AppError::NotFound)));
        assert!(matches!(
            service.track_order(4, TrackingRequest::default()).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(service.track_order(4, wrong_email).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_orders_applies_filter() {
        let mut storage = MockStorage::new();
        storage.expect_get_all_orders().returning(|| {
            Ok(vec![
                stored(3, None, OrderStatus::Delivered),
                stored(2, None, OrderStatus::Pending),
                stored(1, None, OrderStatus::Pending),
            ])
        });

        let service = desk(storage, MockNotifier::new());
        let pending = service
            .list_orders(OrderFilter { status: Some(OrderStatus::Pending), q: None })
            .await
            .unwrap();
        let ids: Vec<i32> = pending.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
