//! Catalog product entity and its write payload.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::money;
use super::validation::{empty_string_as_none, positive_amount};

/// A catalog entry. `price` is per kilogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Fresh Tomatoes")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "money")]
    #[schema(value_type = String, example = "45.00")]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Create/update payload for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    #[schema(example = "Fresh Tomatoes", min_length = 2)]
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[schema(example = "Premium quality, farm-fresh tomatoes")]
    pub description: Option<String>,
    #[serde(with = "money")]
    #[validate(custom(function = "positive_amount"))]
    #[schema(value_type = String, example = "45.00")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(url(message = "Image URL must be a valid URL"))]
    #[schema(example = "https://images.example.com/tomatoes.jpg")]
    pub image_url: Option<String>,
}

impl ProductInput {
    /// Attach an id, producing the stored entity.
    pub fn into_product(self, id: i32) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: money::normalize(self.price),
            image_url: self.image_url,
        }
    }
}
