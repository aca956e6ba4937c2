//! Data access for the storefront.
//!
//! # Database: `servicecart`
//!
//! ## Tables (schema `storefront`)
//!
//! - `service_class` - Top-level catalog categories
//! - `service` - Services within a class
//! - `package` - Priced variants of a service
//! - `package_feature` - Bullet points of a package
//! - `payment_method` - Admin-curated checkout options
//! - `checkout_order` - Immutable order snapshots
//!
//! Sessions (and therefore carts) live in `tower_sessions.session`.
//!
//! # Stores
//!
//! Handlers talk to the [`Store`] trait, never to a pool directly.
//! [`PgStore`] backs production; [`MemoryStore`] backs tests and local
//! experiments.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p servicecart-cli -- migrate
//! ```

pub mod catalog;
pub mod memory;
pub mod orders;
pub mod payments;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::{PgPool, Postgres, Transaction};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use servicecart_core::{
    ListedPackage, Order, OrderId, Package, PackageId, PaymentMethod, Service, ServiceClass,
    ServiceClassId, ServiceId,
};

pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate name or slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique violations to [`RepositoryError::Conflict`].
    fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Read access to the catalog tree.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All classes by display order.
    async fn list_classes(&self) -> Result<Vec<ServiceClass>, RepositoryError>;

    async fn get_class_by_slug(&self, slug: &str) -> Result<Option<ServiceClass>, RepositoryError>;

    /// Services of one class by name.
    async fn list_services_in_class(
        &self,
        class_id: ServiceClassId,
    ) -> Result<Vec<Service>, RepositoryError>;

    /// Resolve a service only under its own class slug.
    async fn get_service_by_slug(
        &self,
        class_slug: &str,
        service_slug: &str,
    ) -> Result<Option<Service>, RepositoryError>;

    /// Active packages by ascending minimum price, features attached in order.
    async fn list_active_packages(
        &self,
        service_id: ServiceId,
    ) -> Result<Vec<ListedPackage>, RepositoryError>;

    /// A single package, active or not.
    async fn get_package(&self, id: PackageId) -> Result<Option<Package>, RepositoryError>;

    /// Every package among `ids` that still exists, active or not.
    async fn find_packages(&self, ids: &[PackageId]) -> Result<Vec<Package>, RepositoryError>;
}

/// Read access to payment methods.
#[async_trait]
pub trait PaymentMethodStore: Send + Sync {
    /// Methods with `is_visible` set, by sort order.
    async fn list_visible_payment_methods(&self) -> Result<Vec<PaymentMethod>, RepositoryError>;

    async fn get_payment_method_by_code(
        &self,
        code: &str,
    ) -> Result<Option<PaymentMethod>, RepositoryError>;
}

/// Append-only order log.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert one order stamped with the current time.
    async fn create_order(
        &self,
        session_key: &str,
        total_amount: Decimal,
    ) -> Result<Order, RepositoryError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Most recent orders first.
    async fn list_recent_orders(&self, limit: i64) -> Result<Vec<Order>, RepositoryError>;
}

/// Everything the storefront needs from persistence.
#[async_trait]
pub trait Store: CatalogStore + PaymentMethodStore + OrderStore {
    /// Cheap connectivity check for the readiness endpoint.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Start a catalog write. Nothing is visible to readers until
    /// [`CatalogWriter::commit`]; dropping the writer rolls everything back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection is available.
    pub async fn begin_catalog_write(&self) -> Result<CatalogWriter, RepositoryError> {
        Ok(CatalogWriter {
            tx: self.pool.begin().await?,
        })
    }
}

/// Catalog and payment method writes sharing one transaction.
///
/// The insert and delete operations live next to the matching reads in
/// [`catalog`] and [`payments`].
pub struct CatalogWriter {
    tx: Transaction<'static, Postgres>,
}

impl CatalogWriter {
    /// Make every write visible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the commit fails.
    pub async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
