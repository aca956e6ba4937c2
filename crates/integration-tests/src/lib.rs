//! Integration tests for ServiceCart.
//!
//! These tests drive a running storefront over HTTP and arrange their own
//! catalog rows directly in its database.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the storefront
//! cargo run -p servicecart-cli -- migrate
//! cargo run -p servicecart-storefront
//!
//! # Run the ignored integration tests
//! cargo test -p servicecart-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Storefront address (default `http://localhost:3000`)
//! - `STOREFRONT_DATABASE_URL` - Database the storefront uses (falls back to `DATABASE_URL`)

use reqwest::{Client, redirect};
use rust_decimal::Decimal;
use secrecy::SecretString;
use uuid::Uuid;

use servicecart_core::{ButtonBehavior, DurationUnit, Package, PriceRange, Service, ServiceClass};
use servicecart_storefront::db::{self, PgStore};
use servicecart_storefront::models::{
    NewPackage, NewPaymentMethod, NewService, NewServiceClass,
};

/// Base URL of the running storefront.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client that keeps the session cookie and does not follow redirects,
/// so tests can assert on 303 responses.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the storefront database.
///
/// # Panics
///
/// Panics if no database URL is configured or the connection fails.
pub async fn store() -> PgStore {
    dotenvy::dotenv().ok();
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("STOREFRONT_DATABASE_URL not set");

    let pool = db::create_pool(&url)
        .await
        .expect("Failed to connect to storefront database");
    PgStore::new(pool)
}

/// Catalog rows created for a single test, named uniquely so tests can run
/// against a shared database.
pub struct Fixture {
    pub class: ServiceClass,
    pub service: Service,
    /// `$100 - $150`, add to cart.
    pub ranged: Package,
    /// `$40`, contact sales.
    pub contact_only: Package,
    /// Enabled payment method code.
    pub enabled_method: String,
    /// Disabled but visible payment method code.
    pub disabled_method: String,
}

impl Fixture {
    /// Insert a class, one service with two packages, and two payment methods.
    ///
    /// # Panics
    ///
    /// Panics if any insert fails.
    pub async fn create(store: &PgStore) -> Self {
        let tag = Uuid::new_v4().simple().to_string();
        let mut writer = store
            .begin_catalog_write()
            .await
            .expect("Failed to start catalog write");

        let class = writer
            .create_service_class(&NewServiceClass {
                name: format!("Test Class {tag}"),
                description: "Integration test class".to_string(),
                display_order: 9_999,
            })
            .await
            .expect("Failed to create class");

        let service = writer
            .create_service(&NewService {
                service_class_id: class.id,
                name: format!("Test Service {tag}"),
                short_description: "Integration test service".to_string(),
                detailed_description: String::new(),
            })
            .await
            .expect("Failed to create service");

        let ranged = writer
            .create_package(&NewPackage {
                service_id: service.id,
                package_type: "Ranged".to_string(),
                duration_unit: DurationUnit::Month,
                duration_value: "1 Month".to_string(),
                price: PriceRange::new(Decimal::from(100), Decimal::from(150)),
                button: ButtonBehavior::AddToCart,
                is_active: true,
            })
            .await
            .expect("Failed to create package");

        let contact_only = writer
            .create_package(&NewPackage {
                service_id: service.id,
                package_type: "Bespoke".to_string(),
                duration_unit: DurationUnit::Project,
                duration_value: "Custom".to_string(),
                price: PriceRange::fixed(Decimal::from(40)),
                button: ButtonBehavior::ContactSales,
                is_active: true,
            })
            .await
            .expect("Failed to create package");

        let enabled_method = format!("it-on-{tag}");
        let disabled_method = format!("it-off-{tag}");
        for (code, is_enabled) in [(&enabled_method, true), (&disabled_method, false)] {
            writer
                .create_payment_method(&NewPaymentMethod {
                    name: code.clone(),
                    code: code.clone(),
                    is_enabled,
                    is_visible: true,
                    sort_order: 9_999,
                })
                .await
                .expect("Failed to create payment method");
        }
        writer.commit().await.expect("Failed to commit fixture");

        Self {
            class,
            service,
            ranged,
            contact_only,
            enabled_method,
            disabled_method,
        }
    }

    /// Path of the fixture's service page.
    #[must_use]
    pub fn service_path(&self) -> String {
        format!("/services/{}/{}/", self.class.slug, self.service.slug)
    }

    /// Delete the fixture's catalog rows and payment methods. Orders stay.
    pub async fn cleanup(self, store: &PgStore) {
        let _ = sqlx::query("DELETE FROM storefront.service_class WHERE id = $1")
            .bind(self.class.id)
            .execute(store.pool())
            .await;
        let _ = sqlx::query("DELETE FROM storefront.payment_method WHERE code = ANY($1)")
            .bind(vec![self.enabled_method, self.disabled_method])
            .execute(store.pool())
            .await;
    }
}
