//! Service Container - Centralized service access.
//!
//! Handlers depend on the service traits, never on concrete types, so the
//! container can be swapped for a mock in tests.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, Catalog, OrderDesk, OrderService, ProductService,
};
use crate::config::Config;
use crate::infra::Storage;
use crate::notifications::{EmailNotifier, Notifier};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get product catalog service
    fn products(&self) -> Arc<dyn ProductService>;

    /// Get order workflow service
    fn orders(&self) -> Arc<dyn OrderService>;

    /// Storage backing the services, for health checks
    fn storage(&self) -> Arc<dyn Storage>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    product_service: Arc<dyn ProductService>,
    order_service: Arc<dyn OrderService>,
    storage: Arc<dyn Storage>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        product_service: Arc<dyn ProductService>,
        order_service: Arc<dyn OrderService>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            auth_service,
            product_service,
            order_service,
            storage,
        }
    }

    /// Wire the default implementations over one storage backend.
    pub fn from_storage(storage: Arc<dyn Storage>, config: &Config) -> Self {
        let notifier: Arc<dyn Notifier> = Arc::new(EmailNotifier::from_config(config));

        Self {
            auth_service: Arc::new(Authenticator::new(storage.clone(), config.session_ttl())),
            product_service: Arc::new(Catalog::new(storage.clone())),
            order_service: Arc::new(OrderDesk::new(storage.clone(), notifier)),
            storage,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }
}
