//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, order_handler, product_handler};
use crate::domain::{Order, OrderDraft, OrderItem, OrderStatus, Product, ProductInput, UserResponse, UserRole};
use crate::types::MessageResponse;

/// OpenAPI documentation for the produce marketplace
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Produce Market API",
        version = "0.1.0",
        description = "Catalog, checkout, order tracking and admin order desk for a produce marketplace. Money values are decimal strings with two places.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::session,
        // Catalog
        product_handler::list_products,
        product_handler::get_product,
        product_handler::create_product,
        product_handler::update_product,
        product_handler::delete_product,
        // Orders
        order_handler::create_order,
        order_handler::list_orders,
        order_handler::my_orders,
        order_handler::get_order,
        order_handler::update_order_status,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            Product,
            ProductInput,
            Order,
            OrderItem,
            OrderDraft,
            OrderStatus,
            MessageResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            order_handler::StatusUpdateRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and sessions"),
        (name = "Products", description = "Public catalog and admin inventory"),
        (name = "Orders", description = "Checkout, tracking and order status")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the session cookie
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "sid",
                    "Session id set by /api/auth/login",
                ))),
            );
        }
    }
}
