//! First-run data: sample catalog and the admin account.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::config::AdminAccount;
use crate::domain::{NewUser, Password, ProductInput, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::Storage;

/// (name, description, price per kg, image)
const SAMPLE_CATALOG: &[(&str, &str, &str, &str)] = &[
    (
        "Fresh Tomatoes",
        "Premium quality, farm-fresh tomatoes",
        "45.00",
        "https://images.unsplash.com/photo-1592924357228-91a4daadcfea",
    ),
    (
        "Potatoes",
        "Fresh potatoes, perfect for all types of cooking",
        "25.00",
        "https://images.unsplash.com/photo-1518977676601-b53f82aba655",
    ),
    (
        "Onions",
        "High-quality red onions",
        "30.00",
        "https://images.unsplash.com/photo-1580201092675-a0a6a6cafbb1",
    ),
    (
        "Carrots",
        "Crunchy and nutritious carrots",
        "40.00",
        "https://images.unsplash.com/photo-1598170845058-32b9d6a5da37",
    ),
];

/// Outcome of a bootstrap run, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub products_seeded: usize,
    pub admin_created: bool,
}

/// Seed the catalog when it is empty and make sure the admin account exists.
/// Safe to run on every start.
pub async fn run(storage: &dyn Storage, admin: &AdminAccount) -> AppResult<BootstrapReport> {
    let mut report = BootstrapReport::default();

    if storage.get_all_products().await?.is_empty() {
        for (name, description, price, image_url) in SAMPLE_CATALOG {
            let price = Decimal::from_str(price)
                .map_err(|e| AppError::internal(format!("bad sample price {}: {}", price, e)))?;
            storage
                .create_product(ProductInput {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    price,
                    image_url: Some(image_url.to_string()),
                })
                .await?;
            report.products_seeded += 1;
        }
        tracing::info!(count = report.products_seeded, "Seeded sample catalog");
    }

    let password = Password::new(&admin.password)?;
    report.admin_created = storage
        .ensure_user(NewUser {
            username: admin.username.clone(),
            password_hash: password.into_string(),
            email: admin.email.clone(),
            role: UserRole::Admin,
        })
        .await?;

    if report.admin_created {
        tracing::warn!(
            username = %admin.username,
            "Created admin account; change its password before going live"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::password::verify_password;
    use crate::infra::MemoryStorage;

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let storage = MemoryStorage::new();
        let admin = Config::default().admin;

        let first = run(&storage, &admin).await.unwrap();
        assert_eq!(first.products_seeded, 4);
        assert!(first.admin_created);

        let second = run(&storage, &admin).await.unwrap();
        assert_eq!(second, BootstrapReport::default());
        assert_eq!(storage.get_all_products().await.unwrap().len(), 4);

        let user = storage
            .get_user_by_username(&admin.username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(verify_password(&admin.password, &user.password_hash));
    }

    #[tokio::test]
    async fn test_catalog_is_not_reseeded() {
        let storage = MemoryStorage::new();
        storage
            .create_product(ProductInput {
                name: "Garlic".to_string(),
                description: None,
                price: Decimal::from(60),
                image_url: None,
            })
            .await
            .unwrap();

        let report = run(&storage, &Config::default().admin).await.unwrap();
        assert_eq!(report.products_seeded, 0);
    }
}
