//! Order entity, its item snapshots and the status workflow.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::money;
use super::validation::non_negative_amount;
use crate::config::{STATUS_DELIVERED, STATUS_IN_PROGRESS, STATUS_PENDING};
use crate::errors::{AppError, FieldError};

/// Order lifecycle: pending → in_progress → delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => STATUS_PENDING,
            OrderStatus::InProgress => STATUS_IN_PROGRESS,
            OrderStatus::Delivered => STATUS_DELIVERED,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::InProgress => 1,
            OrderStatus::Delivered => 2,
        }
    }

    /// Forward moves (including skipping a step) and re-setting the current
    /// status are allowed; moving backward is not.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        next.rank() >= self.rank()
    }

    /// Statuses that strictly come before this one.
    pub fn predecessors(&self) -> Vec<OrderStatus> {
        Self::ALL
            .into_iter()
            .filter(|s| s.rank() < self.rank())
            .collect()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(OrderStatus::Pending),
            STATUS_IN_PROGRESS => Ok(OrderStatus::InProgress),
            STATUS_DELIVERED => Ok(OrderStatus::Delivered),
            other => Err(AppError::validation(format!(
                "Unknown order status '{}'",
                other
            ))),
        }
    }
}

/// Product data frozen at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[validate(range(min = 0, message = "Product id must not be negative"))]
    #[schema(example = 1)]
    pub product_id: i32,
    #[schema(example = "Fresh Tomatoes")]
    pub product_name: String,
    #[serde(with = "money")]
    #[validate(custom(function = "non_negative_amount"))]
    #[schema(value_type = String, example = "45.00")]
    pub price: Decimal,
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    #[schema(example = 2)]
    pub quantity: i32,
    #[serde(with = "money")]
    #[validate(custom(function = "non_negative_amount"))]
    #[schema(value_type = String, example = "90.00")]
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[schema(example = 42)]
    pub id: i32,
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_pincode: String,
    #[serde(with = "money")]
    #[schema(value_type = String, example = "90.00")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub email_notified: bool,
}

impl Order {
    /// Materialize a new order. Status and timestamp are always server-set.
    pub fn place(id: i32, new: NewOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            customer_phone: new.customer_phone,
            delivery_address: new.delivery_address,
            delivery_city: new.delivery_city,
            delivery_pincode: new.delivery_pincode,
            total_amount: new.total_amount,
            status: OrderStatus::Pending,
            items: new.items,
            created_at,
            email_notified: false,
        }
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == Some(user_id)
    }
}

/// Checkout payload submitted by a buyer.
///
/// Any `id`, `status` or `createdAt` sent by the client is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    #[validate(length(min = 1, message = "Customer name is required"))]
    #[schema(example = "Asha Rao")]
    pub customer_name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "asha@example.com")]
    pub customer_email: String,
    #[validate(length(min = 10, message = "Phone number must be at least 10 digits"))]
    #[schema(example = "9876543210")]
    pub customer_phone: String,
    #[validate(length(min = 5, message = "Address must be at least 5 characters"))]
    #[schema(example = "12 Market Road")]
    pub delivery_address: String,
    #[validate(length(min = 2, message = "City must be at least 2 characters"))]
    #[schema(example = "Pune")]
    pub delivery_city: String,
    #[validate(length(min = 6, message = "Pincode must be at least 6 characters"))]
    #[schema(example = "411001")]
    pub delivery_pincode: String,
    #[serde(with = "money")]
    #[validate(custom(function = "non_negative_amount"))]
    #[schema(value_type = String, example = "90.00")]
    pub total_amount: Decimal,
    #[validate(length(min = 1, message = "Order must contain at least one item"), nested)]
    pub items: Vec<OrderItem>,
}

impl OrderDraft {
    /// Recompute line totals and the order total and compare with what the
    /// client submitted.
    pub fn check_totals(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut sum = Some(Decimal::ZERO);

        for (index, item) in self.items.iter().enumerate() {
            let field = format!("items[{}].total", index);
            match money::line_total(item.price, item.quantity) {
                Some(expected) => {
                    if money::normalize(item.total) != expected {
                        errors.push(FieldError::new(
                            field,
                            format!("Item total must equal price × quantity ({})", expected),
                        ));
                    }
                    sum = sum.and_then(|s| s.checked_add(expected));
                }
                None => {
                    errors.push(FieldError::new(field, "Item total is out of range"));
                    sum = None;
                }
            }
        }

        match sum.map(money::normalize) {
            Some(sum) if sum == money::normalize(self.total_amount) => {}
            Some(sum) => errors.push(FieldError::new(
                "totalAmount",
                format!("Total amount must equal the sum of item totals ({})", sum),
            )),
            None => errors.push(FieldError::new("totalAmount", "Total amount is out of range")),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn into_new_order(self, user_id: Option<i32>) -> NewOrder {
        NewOrder {
            user_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            delivery_address: self.delivery_address,
            delivery_city: self.delivery_city,
            delivery_pincode: self.delivery_pincode,
            total_amount: money::normalize(self.total_amount),
            items: self.items,
        }
    }
}

/// Storage input for `create_order`. Carries no id, status or timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_pincode: String,
    pub total_amount: Decimal,
    pub items: Vec<OrderItem>,
}

/// Admin dashboard filters for the order list.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Matches order id, customer name or customer email
    pub q: Option<String>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }

        match self.q.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                order.id.to_string().contains(&query)
                    || order.customer_name.to_lowercase().contains(&query)
                    || order.customer_email.to_lowercase().contains(&query)
            }
        }
    }
}
