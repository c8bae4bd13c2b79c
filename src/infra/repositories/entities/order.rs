//! Order database entity for SeaORM.
//!
//! `items` holds the serialized line-item snapshots.

use sea_orm::entity::prelude::*;

use crate::domain::{money, Order, OrderItem, OrderStatus};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[sea_orm(column_type = "Text")]
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_pincode: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_amount: Decimal,
    pub status: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub items: Json,
    pub created_at: DateTimeUtc,
    pub email_notified: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A corrupt status or items blob surfaces as an internal error.
impl TryFrom<Model> for Order {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status: OrderStatus = model.status.parse().map_err(|_| {
            AppError::internal(format!(
                "order {} has unknown status '{}'",
                model.id, model.status
            ))
        })?;
        let items: Vec<OrderItem> = serde_json::from_value(model.items).map_err(|e| {
            AppError::internal(format!("order {} has malformed items: {}", model.id, e))
        })?;

        Ok(Order {
            id: model.id,
            user_id: model.user_id,
            customer_name: model.customer_name,
            customer_email: model.customer_email,
            customer_phone: model.customer_phone,
            delivery_address: model.delivery_address,
            delivery_city: model.delivery_city,
            delivery_pincode: model.delivery_pincode,
            total_amount: money::normalize(model.total_amount),
            status,
            items,
            created_at: model.created_at,
            email_notified: model.email_notified,
        })
    }
}
