//! Catalog service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::validation::validate;
use crate::domain::{Product, ProductInput};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::Storage;

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    async fn get_product(&self, id: i32) -> AppResult<Product>;

    async fn create_product(&self, input: ProductInput) -> AppResult<Product>;

    async fn update_product(&self, id: i32, input: ProductInput) -> AppResult<Product>;

    async fn delete_product(&self, id: i32) -> AppResult<()>;
}

pub struct Catalog {
    storage: Arc<dyn Storage>,
}

impl Catalog {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ProductService for Catalog {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.storage.get_all_products().await
    }

    async fn get_product(&self, id: i32) -> AppResult<Product> {
        self.storage.get_product_by_id(id).await?.ok_or_not_found()
    }

    async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        validate(&input)?;
        let product = self.storage.create_product(input).await?;
        tracing::info!(product_id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    async fn update_product(&self, id: i32, input: ProductInput) -> AppResult<Product> {
        validate(&input)?;
        let product = self
            .storage
            .update_product(id, input)
            .await?
            .ok_or_not_found()?;
        tracing::info!(product_id = id, "Product updated");
        Ok(product)
    }

    async fn delete_product(&self, id: i32) -> AppResult<()> {
        if !self.storage.delete_product(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }
}
