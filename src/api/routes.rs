//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{auth_routes, order_routes, product_routes};
use super::middleware::session_middleware;
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::API_PREFIX;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Every API route sees the session (if any); access rules live in the extractors
    let session = middleware::from_fn_with_state(state.clone(), session_middleware);

    let api = Router::new()
        .nest("/auth", auth_routes().route_layer(session.clone()))
        .nest("/products", product_routes().route_layer(session.clone()))
        .nest("/orders", order_routes().route_layer(session));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest(API_PREFIX, api)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Produce Market API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    storage: StorageHealth,
}

#[derive(Serialize)]
struct StorageHealth {
    backend: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with a storage round-trip
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let backend = state.storage.backend_name();

    match state.storage.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                storage: StorageHealth {
                    backend,
                    status: "healthy",
                    error: None,
                },
            }),
        ),
        Err(e) => {
            tracing::error!(backend, error = %e, "Storage health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    storage: StorageHealth {
                        backend,
                        status: "unhealthy",
                        error: Some(e.to_string()),
                    },
                }),
            )
        }
    }
}
