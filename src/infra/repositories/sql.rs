//! PostgreSQL storage backend built on SeaORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use super::entities::{order, product, session, user};
use super::Storage;
use crate::domain::{
    money, NewOrder, NewUser, Order, OrderStatus, Product, ProductInput, Session, User,
};
use crate::errors::{AppError, AppResult};
use crate::infra::db::Database;

/// Storage backed by a pooled database connection.
pub struct SqlStorage {
    database: Database,
}

impl SqlStorage {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn db(&self) -> &DatabaseConnection {
        self.database.connection()
    }
}

fn user_model(user: NewUser) -> user::ActiveModel {
    user::ActiveModel {
        username: Set(user.username),
        password_hash: Set(user.password_hash),
        email: Set(user.email),
        role: Set(user.role.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
}

fn product_fields(model: &mut product::ActiveModel, input: ProductInput) {
    model.name = Set(input.name);
    model.description = Set(input.description);
    model.price = Set(money::normalize(input.price));
    model.image_url = Set(input.image_url);
}

fn into_orders(models: Vec<order::Model>) -> AppResult<Vec<Order>> {
    models.into_iter().map(Order::try_from).collect()
}

#[async_trait]
impl Storage for SqlStorage {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        match user_model(user).insert(self.db()).await {
            Ok(model) => Ok(User::from(model)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AppError::conflict("Username"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_user(&self, user: NewUser) -> AppResult<bool> {
        let rows = user::Entity::insert(user_model(user))
            .on_conflict(
                OnConflict::column(user::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db())
            .await?;

        Ok(rows > 0)
    }

    async fn get_user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let result = user::Entity::find_by_id(id).one(self.db()).await?;
        Ok(result.map(User::from))
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db())
            .await?;

        Ok(result.map(User::from))
    }

    async fn get_all_products(&self) -> AppResult<Vec<Product>> {
        let models = product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(self.db())
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn get_product_by_id(&self, id: i32) -> AppResult<Option<Product>> {
        let result = product::Entity::find_by_id(id).one(self.db()).await?;
        Ok(result.map(Product::from))
    }

    async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        let mut active = <product::ActiveModel as Default>::default();
        product_fields(&mut active, input);

        let model = active.insert(self.db()).await?;
        Ok(Product::from(model))
    }

    async fn update_product(&self, id: i32, input: ProductInput) -> AppResult<Option<Product>> {
        let Some(existing) = product::Entity::find_by_id(id).one(self.db()).await? else {
            return Ok(None);
        };

        let mut active = existing.into_active_model();
        product_fields(&mut active, input);

        let model = active.update(self.db()).await?;
        Ok(Some(Product::from(model)))
    }

    async fn delete_product(&self, id: i32) -> AppResult<bool> {
        let result = product::Entity::delete_by_id(id).exec(self.db()).await?;
        Ok(result.rows_affected > 0)
    }

    async fn get_all_orders(&self) -> AppResult<Vec<Order>> {
        let models = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(self.db())
            .await?;

        into_orders(models)
    }

    async fn get_orders_by_user_id(&self, user_id: i32) -> AppResult<Vec<Order>> {
        let models = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(self.db())
            .await?;

        into_orders(models)
    }

    async fn get_order_by_id(&self, id: i32) -> AppResult<Option<Order>> {
        order::Entity::find_by_id(id)
            .one(self.db())
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn create_order(&self, new: NewOrder) -> AppResult<Order> {
        let items = serde_json::to_value(&new.items)
            .map_err(|e| AppError::internal(format!("failed to encode order items: {}", e)))?;

        let active = order::ActiveModel {
            user_id: Set(new.user_id),
            customer_name: Set(new.customer_name),
            customer_email: Set(new.customer_email),
            customer_phone: Set(new.customer_phone),
            delivery_address: Set(new.delivery_address),
            delivery_city: Set(new.delivery_city),
            delivery_pincode: Set(new.delivery_pincode),
            total_amount: Set(money::normalize(new.total_amount)),
            status: Set(OrderStatus::Pending.to_string()),
            items: Set(items),
            created_at: Set(Utc::now()),
            email_notified: Set(false),
            ..Default::default()
        };

        let model = active.insert(self.db()).await?;
        Order::try_from(model)
    }

    async fn update_order_status(
        &self,
        id: i32,
        status: OrderStatus,
    ) -> AppResult<Option<Order>> {
        let Some(existing) = order::Entity::find_by_id(id).one(self.db()).await? else {
            return Ok(None);
        };

        let mut active = existing.into_active_model();
        active.status = Set(status.to_string());

        let model = active.update(self.db()).await?;
        Order::try_from(model).map(Some)
    }

    async fn advance_order_status(
        &self,
        id: i32,
        status: OrderStatus,
    ) -> AppResult<Option<Order>> {
        let predecessors: Vec<&str> = status.predecessors().iter().map(|s| s.as_str()).collect();
        if predecessors.is_empty() {
            return Ok(None);
        }

        // Guarded in the WHERE clause so concurrent writers cannot move it backward
        let result = order::Entity::update_many()
            .col_expr(order::Column::Status, Expr::value(status.as_str()))
            .filter(order::Column::Id.eq(id))
            .filter(order::Column::Status.is_in(predecessors))
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_order_by_id(id).await
    }

    async fn mark_order_as_notified(&self, id: i32) -> AppResult<bool> {
        let result = order::Entity::update_many()
            .col_expr(order::Column::EmailNotified, Expr::value(true))
            .filter(order::Column::Id.eq(id))
            .exec(self.db())
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn create_session(&self, session: Session) -> AppResult<()> {
        let active = session::ActiveModel {
            id: Set(session.id),
            user_id: Set(session.user_id),
            created_at: Set(session.created_at),
            expires_at: Set(session.expires_at),
        };

        session::Entity::insert(active)
            .exec_without_returning(self.db())
            .await?;
        Ok(())
    }

    async fn get_session(&self, id: &str) -> AppResult<Option<Session>> {
        let result = session::Entity::find_by_id(id.to_owned())
            .one(self.db())
            .await?;

        Ok(result.map(Session::from))
    }

    async fn delete_session(&self, id: &str) -> AppResult<bool> {
        let result = session::Entity::delete_by_id(id.to_owned())
            .exec(self.db())
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(self.db())
            .await?;

        Ok(result.rows_affected)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(self.database.ping().await?)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
