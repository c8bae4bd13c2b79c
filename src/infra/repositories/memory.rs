//! In-memory storage backend.
//!
//! Everything lives behind one `RwLock`, so each operation is atomic with
//! respect to the others. Data is lost on restart; use for development only.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::Storage;
use crate::domain::{
    NewOrder, NewUser, Order, OrderStatus, Product, ProductInput, Session, User,
};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    products: BTreeMap<i32, Product>,
    orders: BTreeMap<i32, Order>,
    sessions: BTreeMap<String, Session>,
    next_user_id: i32,
    next_product_id: i32,
    next_order_id: i32,
}

impl Tables {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }

    fn username_taken(&self, username: &str) -> bool {
        self.users.values().any(|u| u.username == username)
    }

    fn insert_user(&mut self, user: NewUser) -> User {
        let id = Self::next_id(&mut self.next_user_id);
        let user = User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            email: user.email,
            role: user.role,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        user
    }
}

/// Process-local storage backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    orders
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(&user.username) {
            return Err(AppError::conflict("Username"));
        }
        Ok(tables.insert_user(user))
    }

    async fn ensure_user(&self, user: NewUser) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(&user.username) {
            return Ok(false);
        }
        tables.insert_user(user);
        Ok(true)
    }

    async fn get_user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_all_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn get_product_by_id(&self, id: i32) -> AppResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        let mut tables = self.tables.write().await;
        let id = Tables::next_id(&mut tables.next_product_id);
        let product = input.into_product(id);
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i32, input: ProductInput) -> AppResult<Option<Product>> {
        let mut tables = self.tables.write().await;
        Ok(tables.products.get_mut(&id).map(|slot| {
            *slot = input.into_product(id);
            slot.clone()
        }))
    }

    async fn delete_product(&self, id: i32) -> AppResult<bool> {
        Ok(self.tables.write().await.products.remove(&id).is_some())
    }

    async fn get_all_orders(&self) -> AppResult<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.orders.values().cloned().collect()))
    }

    async fn get_orders_by_user_id(&self, user_id: i32) -> AppResult<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .orders
                .values()
                .filter(|o| o.is_owned_by(user_id))
                .cloned()
                .collect(),
        ))
    }

    async fn get_order_by_id(&self, id: i32) -> AppResult<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn create_order(&self, order: NewOrder) -> AppResult<Order> {
        let mut tables = self.tables.write().await;
        let id = Tables::next_id(&mut tables.next_order_id);
        let order = Order::place(id, order, Utc::now());
        tables.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn update_order_status(
        &self,
        id: i32,
        status: OrderStatus,
    ) -> AppResult<Option<Order>> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.get_mut(&id).map(|order| {
            order.status = status;
            order.clone()
        }))
    }

    async fn advance_order_status(
        &self,
        id: i32,
        status: OrderStatus,
    ) -> AppResult<Option<Order>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .orders
            .get_mut(&id)
            .filter(|order| status.predecessors().contains(&order.status))
            .map(|order| {
                order.status = status;
                order.clone()
            }))
    }

    async fn mark_order_as_notified(&self, id: i32) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(match tables.orders.get_mut(&id) {
            Some(order) => {
                order.email_notified = true;
                true
            }
            None => false,
        })
    }

    async fn create_session(&self, session: Session) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get_session(&self, id: &str) -> AppResult<Option<Session>> {
        Ok(self.tables.read().await.sessions.get(id).cloned())
    }

    async fn delete_session(&self, id: &str) -> AppResult<bool> {
        Ok(self.tables.write().await.sessions.remove(id).is_some())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
