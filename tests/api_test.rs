//! Integration tests for API endpoints.
//!
//! These drive the real router over `MemoryStorage`, so no database is
//! needed. Sessions travel as the `sid` cookie exactly as in production.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio_test::assert_ok;
use tower::ServiceExt;

use produce_market::api::{create_router, AppState};
use produce_market::config::Config;
use produce_market::domain::{Cart, CustomerDetails, Product};
use produce_market::infra::{bootstrap, MemoryStorage, Storage};

// =============================================================================
// Test Helpers
// =============================================================================

struct TestApp {
    router: Router,
    config: Config,
}

struct TestResponse {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

impl TestApp {
    async fn new() -> Self {
        let config = Config::default();
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        assert_ok!(bootstrap::run(storage.as_ref(), &config.admin).await);

        let router = create_router(AppState::from_config(storage, &config));
        Self { router, config }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse { status, cookie, body }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, None, cookie).await
    }

    async fn post(&self, uri: &str, body: Value, cookie: Option<&str>) -> TestResponse {
        self.request(Method::POST, uri, Some(body), cookie).await
    }

    async fn put(&self, uri: &str, body: Value, cookie: Option<&str>) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), cookie).await
    }

    async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, None, cookie).await
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/auth/login",
                json!({ "username": username, "password": password }),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.cookie.expect("login sets a session cookie")
    }

    async fn login_admin(&self) -> String {
        let admin = self.config.admin.clone();
        self.login(&admin.username, &admin.password).await
    }

    async fn register_and_login(&self, username: &str) -> String {
        let response = self
            .post(
                "/api/auth/register",
                json!({
                    "username": username,
                    "password": "password1",
                    "email": format!("{}@x.com", username)
                }),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        self.login(username, "password1").await
    }
}

fn customer() -> CustomerDetails {
    CustomerDetails {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "9876543210".to_string(),
        address: "12 Market Road".to_string(),
        city: "Pune".to_string(),
        pincode: "411001".to_string(),
    }
}

fn order_body(product: &Product, quantity: i32) -> Value {
    let mut cart = Cart::new();
    cart.add_item(product, quantity);
    serde_json::to_value(cart.checkout(customer())).unwrap()
}

async fn first_product(app: &TestApp) -> Product {
    let response = app.get("/api/products", None).await;
    serde_json::from_value(response.body[0].clone()).unwrap()
}

// =============================================================================
// Root & Health
// =============================================================================

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::new().await;

    let root = app.get("/", None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body, "Produce Market API");

    let health = app.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "healthy");
    assert_eq!(health.body["storage"]["backend"], "memory");
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_register_login_session_flow() {
    let app = TestApp::new().await;

    let register = app
        .post(
            "/api/auth/register",
            json!({ "username": "alice", "password": "password1", "email": "alice@x.com" }),
            None,
        )
        .await;
    assert_eq!(register.status, StatusCode::CREATED);
    assert_eq!(register.body["role"], "buyer");
    assert!(register.body.get("password").is_none());
    assert!(register.body.get("passwordHash").is_none());

    let cookie = app.login("alice", "password1").await;
    assert!(cookie.starts_with("sid="));

    let session = app.get("/api/auth/session", Some(&cookie)).await;
    assert_eq!(session.status, StatusCode::OK);
    assert_eq!(session.body["username"], "alice");
    assert_eq!(session.body["role"], "buyer");

    let again = app
        .post(
            "/api/auth/register",
            json!({ "username": "alice", "password": "password2", "email": "other@x.com" }),
            None,
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_session_requires_cookie() {
    let app = TestApp::new().await;

    let anonymous = app.get("/api/auth/session", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forged = app.get("/api/auth/session", Some("sid=not-a-real-session")).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_credentials_share_one_error() {
    let app = TestApp::new().await;
    app.register_and_login("alice").await;

    let wrong_password = app
        .post("/api/auth/login", json!({ "username": "alice", "password": "wrong-pass" }), None)
        .await;
    let unknown_user = app
        .post("/api/auth/login", json!({ "username": "nobody", "password": "password1" }), None)
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert!(wrong_password.cookie.is_none());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new().await;
    let cookie = app.register_and_login("alice").await;

    let logout = app.request(Method::POST, "/api/auth/logout", None, Some(&cookie)).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.cookie.as_deref(), Some("sid="));

    let session = app.get("/api/auth/session", Some(&cookie)).await;
    assert_eq!(session.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_validation_and_admin_guard() {
    let app = TestApp::new().await;

    let invalid = app
        .post(
            "/api/auth/register",
            json!({ "username": "al", "password": "123", "email": "nope", "role": "root" }),
            None,
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = invalid.body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password", "role", "username"]);

    let self_promoted = app
        .post(
            "/api/auth/register",
            json!({ "username": "mallory", "password": "password1", "email": "m@x.com", "role": "admin" }),
            None,
        )
        .await;
    assert_eq!(self_promoted.status, StatusCode::FORBIDDEN);

    let admin = app.login_admin().await;
    let by_admin = app
        .post(
            "/api/auth/register",
            json!({ "username": "manager", "password": "password1", "email": "mgr@x.com", "role": "admin" }),
            Some(&admin),
        )
        .await;
    assert_eq!(by_admin.status, StatusCode::CREATED);
    assert_eq!(by_admin.body["role"], "admin");
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_catalog_is_seeded_and_public() {
    let app = TestApp::new().await;

    let response = app.get("/api/products", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let products = response.body.as_array().unwrap();
    assert_eq!(products.len(), 4);
    assert_eq!(products[0]["name"], "Fresh Tomatoes");
    assert_eq!(products[0]["price"], "45.00");
}

#[tokio::test]
async fn test_product_round_trip_and_delete_twice() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    let created = app
        .post(
            "/api/products",
            json!({
                "name": "Tomatoes",
                "description": "Vine ripened",
                "price": 45,
                "imageUrl": "https://images.example.com/t.jpg"
            }),
            Some(&admin),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_i64().unwrap();

    let fetched = app.get(&format!("/api/products/{}", id), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);
    assert_eq!(fetched.body["price"], "45.00");
    assert_eq!(fetched.body["description"], "Vine ripened");

    let updated = app
        .put(
            &format!("/api/products/{}", id),
            json!({ "name": "Cherry Tomatoes", "price": "52.5" }),
            Some(&admin),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["price"], "52.50");

    let first = app.delete(&format!("/api/products/{}", id), Some(&admin)).await;
    assert_eq!(first.status, StatusCode::NO_CONTENT);
    let second = app.delete(&format!("/api/products/{}", id), Some(&admin)).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);

    let gone = app.get(&format!("/api/products/{}", id), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_product_price_must_be_positive() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    for price in [json!(0), json!(-3), json!("0.00")] {
        let response = app
            .post("/api/products", json!({ "name": "Okra", "price": price }), Some(&admin))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"]["details"][0]["field"], "price");
    }
}

#[tokio::test]
async fn test_product_price_must_fit_money_column() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    let at_limit = app
        .post("/api/products", json!({ "name": "Saffron", "price": "99999999.99" }), Some(&admin))
        .await;
    assert_eq!(at_limit.status, StatusCode::CREATED);

    for price in [json!(1_000_000_000), json!("50000000000000000000000000000")] {
        let response = app
            .post("/api/products", json!({ "name": "Saffron", "price": price }), Some(&admin))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"]["details"][0]["field"], "price");
    }
}

#[tokio::test]
async fn test_product_writes_require_admin() {
    let app = TestApp::new().await;
    let buyer = app.register_and_login("bob").await;
    let payload = json!({ "name": "Okra", "price": 20 });

    let anonymous = app.post("/api/products", payload.clone(), None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let as_buyer = app.post("/api/products", payload, Some(&buyer)).await;
    assert_eq!(as_buyer.status, StatusCode::FORBIDDEN);
    assert_eq!(as_buyer.body["error"]["code"], "FORBIDDEN");

    let delete = app.delete("/api/products/1", Some(&buyer)).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_checkout_and_status_workflow() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    let product = app
        .post("/api/products", json!({ "name": "Tomatoes", "price": 45 }), Some(&admin))
        .await;
    let product: Product = serde_json::from_value(product.body).unwrap();

    let buyer = app.register_and_login("alice").await;
    let mut body = order_body(&product, 2);
    assert_eq!(body["totalAmount"], "90.00");
    // Client-supplied server fields are ignored
    body["status"] = json!("delivered");
    body["createdAt"] = json!("2001-01-01T00:00:00Z");
    body["id"] = json!(999);

    let placed = app.post("/api/orders", body, Some(&buyer)).await;
    assert_eq!(placed.status, StatusCode::CREATED, "{}", placed.body);
    assert_eq!(placed.body["status"], "pending");
    assert_eq!(placed.body["emailNotified"], false);
    assert_ne!(placed.body["createdAt"], "2001-01-01T00:00:00Z");
    assert!(placed.body["userId"].is_i64());
    let id = placed.body["id"].as_i64().unwrap();

    let updated = app
        .put(
            &format!("/api/orders/{}/status", id),
            json!({ "status": "in_progress" }),
            Some(&admin),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["status"], "in_progress");

    let tracked = app.get(&format!("/api/orders/{}", id), Some(&admin)).await;
    assert_eq!(tracked.status, StatusCode::OK);
    assert_eq!(tracked.body["status"], "in_progress");
    assert_eq!(tracked.body["items"], placed.body["items"]);
    assert_eq!(tracked.body["createdAt"], placed.body["createdAt"]);
    assert_eq!(tracked.body["emailNotified"], true);

    let mine = app.get("/api/orders/mine", Some(&buyer)).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.body.as_array().unwrap().len(), 1);
    assert_eq!(mine.body[0]["id"], id);
}

#[tokio::test]
async fn test_anonymous_checkout_and_tracking_by_email() {
    let app = TestApp::new().await;
    let product = first_product(&app).await;

    let placed = app.post("/api/orders", order_body(&product, 3), None).await;
    assert_eq!(placed.status, StatusCode::CREATED);
    assert!(placed.body["userId"].is_null());
    let id = placed.body["id"].as_i64().unwrap();

    let without_proof = app.get(&format!("/api/orders/{}", id), None).await;
    assert_eq!(without_proof.status, StatusCode::NOT_FOUND);

    let wrong_email = app
        .get(&format!("/api/orders/{}?email=eve@example.com", id), None)
        .await;
    assert_eq!(wrong_email.status, StatusCode::NOT_FOUND);

    let stranger = app.register_and_login("eve").await;
    let as_stranger = app.get(&format!("/api/orders/{}", id), Some(&stranger)).await;
    assert_eq!(as_stranger.status, StatusCode::NOT_FOUND);

    let with_email = app
        .get(&format!("/api/orders/{}?email=ASHA@example.com", id), None)
        .await;
    assert_eq!(with_email.status, StatusCode::OK);
    assert_eq!(with_email.body["totalAmount"], "135.00");
}

#[tokio::test]
async fn test_order_validation_and_totals() {
    let app = TestApp::new().await;
    let product = first_product(&app).await;

    let mut tampered = order_body(&product, 2);
    tampered["totalAmount"] = json!("1.00");
    let response = app.post("/api/orders", tampered, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["details"][0]["field"], "totalAmount");

    let mut invalid = order_body(&product, 2);
    invalid["customerEmail"] = json!("not-an-email");
    invalid["deliveryPincode"] = json!("12");
    invalid["items"][0]["price"] = json!(-1);
    let response = app.post("/api/orders", invalid, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response.body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["customerEmail", "deliveryPincode", "items[0].price"]);

    let mut empty = order_body(&product, 1);
    empty["items"] = json!([]);
    empty["totalAmount"] = json!(0);
    let response = app.post("/api/orders", empty, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_huge_amounts_are_rejected_not_crashed() {
    let app = TestApp::new().await;
    let product = first_product(&app).await;

    let mut body = order_body(&product, 2);
    body["items"][0]["price"] = json!("50000000000000000000000000000");
    let response = app.post("/api/orders", body, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["details"][0]["field"], "items[0].price");

    // The server keeps serving afterwards
    let health = app.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_status_updates_never_move_backward() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let product = first_product(&app).await;

    for _ in 0..10 {
        let placed = app.post("/api/orders", order_body(&product, 1), None).await;
        let uri = format!("/api/orders/{}/status", placed.body["id"]);

        let (delivered, in_progress) = tokio::join!(
            app.put(&uri, json!({ "status": "delivered" }), Some(&admin)),
            app.put(&uri, json!({ "status": "in_progress" }), Some(&admin)),
        );
        assert_eq!(delivered.status, StatusCode::OK);
        assert!(matches!(in_progress.status, StatusCode::OK | StatusCode::CONFLICT));

        let order = app.get(&uri.replace("/status", ""), Some(&admin)).await;
        assert_eq!(order.body["status"], "delivered");
    }
}

#[tokio::test]
async fn test_status_update_rules() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let product = first_product(&app).await;

    let placed = app.post("/api/orders", order_body(&product, 1), None).await;
    let id = placed.body["id"].as_i64().unwrap();
    let uri = format!("/api/orders/{}/status", id);

    let unknown_status = app.put(&uri, json!({ "status": "shipped" }), Some(&admin)).await;
    assert_eq!(unknown_status.status, StatusCode::BAD_REQUEST);

    let delivered = app.put(&uri, json!({ "status": "delivered" }), Some(&admin)).await;
    assert_eq!(delivered.status, StatusCode::OK);

    let backward = app.put(&uri, json!({ "status": "pending" }), Some(&admin)).await;
    assert_eq!(backward.status, StatusCode::CONFLICT);
    assert_eq!(backward.body["error"]["code"], "INVALID_STATUS_TRANSITION");

    let missing = app
        .put("/api/orders/99999/status", json!({ "status": "delivered" }), Some(&admin))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let buyer = app.register_and_login("bob").await;
    let as_buyer = app.put(&uri, json!({ "status": "delivered" }), Some(&buyer)).await;
    assert_eq!(as_buyer.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_order_list_filters() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let product = first_product(&app).await;

    let first = app.post("/api/orders", order_body(&product, 1), None).await;
    let second = app.post("/api/orders", order_body(&product, 2), None).await;
    let first_id = first.body["id"].as_i64().unwrap();
    let second_id = second.body["id"].as_i64().unwrap();

    app.put(
        &format!("/api/orders/{}/status", first_id),
        json!({ "status": "delivered" }),
        Some(&admin),
    )
    .await;

    let all = app.get("/api/orders", Some(&admin)).await;
    assert_eq!(all.status, StatusCode::OK);
    let ids: Vec<i64> = all.body.as_array().unwrap().iter().map(|o| o["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![second_id, first_id]);

    let delivered = app.get("/api/orders?status=delivered", Some(&admin)).await;
    assert_eq!(delivered.body.as_array().unwrap().len(), 1);
    assert_eq!(delivered.body[0]["id"], first_id);

    let by_name = app.get("/api/orders?q=asha", Some(&admin)).await;
    assert_eq!(by_name.body.as_array().unwrap().len(), 2);

    let bad_filter = app.get("/api/orders?status=lost", Some(&admin)).await;
    assert_eq!(bad_filter.status, StatusCode::BAD_REQUEST);

    let anonymous = app.get("/api/orders", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}
