//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Storage;
use crate::services::{AuthService, OrderService, ProductService, ServiceContainer, Services};

use super::session_cookie::SessionCookies;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Authentication and sessions
    pub auth_service: Arc<dyn AuthService>,
    /// Product catalog
    pub product_service: Arc<dyn ProductService>,
    /// Order workflow
    pub order_service: Arc<dyn OrderService>,
    /// Storage backend, for health checks
    pub storage: Arc<dyn Storage>,
    /// Session cookie attributes
    pub cookies: SessionCookies,
}

impl AppState {
    /// Build state with the default services over `storage`.
    pub fn from_config(storage: Arc<dyn Storage>, config: &Config) -> Self {
        let container = Services::from_storage(storage, config);
        Self::from_container(&container, SessionCookies::from_config(config))
    }

    /// Build state from any service container (real or mocked).
    pub fn from_container(container: &dyn ServiceContainer, cookies: SessionCookies) -> Self {
        Self {
            auth_service: container.auth(),
            product_service: container.products(),
            order_service: container.orders(),
            storage: container.storage(),
            cookies,
        }
    }
}
