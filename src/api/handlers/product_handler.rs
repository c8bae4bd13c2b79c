//! Catalog handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::AdminUser;
use crate::api::AppState;
use crate::domain::{Product, ProductInput};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// Create product routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// List the catalog
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses((status = 200, description = "All products by id", body = [Product]))
)]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.product_service.list_products().await?))
}

/// Get one product
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.product_service.get_product(id).await?))
}

/// Add a product (admin)
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Admin only")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(payload): ValidatedJson<ProductInput>,
) -> AppResult<Created<Product>> {
    Ok(Created(state.product_service.create_product(payload).await?))
}

/// Replace a product's fields (admin)
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ProductInput>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.product_service.update_product(id, payload).await?))
}

/// Remove a product (admin)
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    state.product_service.delete_product(id).await?;
    Ok(NoContent)
}
