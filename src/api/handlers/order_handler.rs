//! Order handlers: checkout, tracking and the admin order desk.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{AdminUser, CurrentUser};
use crate::api::AppState;
use crate::domain::{Order, OrderDraft, OrderFilter, OrderStatus};
use crate::errors::AppResult;
use crate::services::TrackingRequest;
use crate::types::Created;

/// Admin order list filters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    /// `pending`, `in_progress` or `delivered`
    pub status: Option<String>,
    /// Free-text search over order id, customer name and e-mail
    pub q: Option<String>,
}

impl OrderListQuery {
    fn into_filter(self) -> AppResult<OrderFilter> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<OrderStatus>()?),
        };
        Ok(OrderFilter { status, q: self.q })
    }
}

/// Order tracking parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrackQuery {
    /// Customer e-mail used at checkout; grants access without a session
    pub email: Option<String>,
}

/// Status change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

/// Create order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/mine", get(my_orders))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_order_status))
}

/// Place an order
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = OrderDraft,
    responses(
        (status = 201, description = "Order placed with status pending", body = Order),
        (status = 400, description = "Validation error or totals mismatch")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<OrderDraft>,
) -> AppResult<Created<Order>> {
    let user_id = user.map(|CurrentUser(u)| u.id);
    let order = state.order_service.place_order(payload, user_id).await?;
    Ok(Created(order))
}

/// List all orders, newest first (admin)
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Matching orders", body = [Order]),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Admin only")
    ),
    security(("session_cookie" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.order_service.list_orders(query.into_filter()?).await?;
    Ok(Json(orders))
}

/// Orders placed by the logged-in user
#[utoipa::path(
    get,
    path = "/api/orders/mine",
    tag = "Orders",
    responses(
        (status = 200, description = "The caller's orders, newest first", body = [Order]),
        (status = 401, description = "Not logged in")
    ),
    security(("session_cookie" = []))
)]
pub async fn my_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.order_service.orders_for_user(user.id).await?))
}

/// Track an order
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = i32, Path, description = "Order id"), TrackQuery),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 404, description = "Unknown order, or caller may not see it")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    user: Option<CurrentUser>,
    Query(query): Query<TrackQuery>,
) -> AppResult<Json<Order>> {
    let request = TrackingRequest {
        viewer: user.map(|CurrentUser(u)| u),
        email: query.email,
    };
    Ok(Json(state.order_service.track_order(id, request).await?))
}

/// Advance an order's status (admin)
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    tag = "Orders",
    params(("id" = i32, Path, description = "Order id")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = Order),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Backward status transition")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<StatusUpdateRequest>,
) -> AppResult<Json<Order>> {
    tracing::debug!(admin_id = admin.id, order_id = id, status = %payload.status, "Status change requested");
    let order = state.order_service.update_status(id, payload.status).await?;
    Ok(Json(order))
}
