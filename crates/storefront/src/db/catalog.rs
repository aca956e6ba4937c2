//! Catalog repository for `PostgreSQL`.
//!
//! Queries are built at runtime with `FromRow` row types so the crate builds
//! without a live database or an offline query cache.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use servicecart_core::{
    ListedPackage, Package, PackageFeature, PackageFeatureId, PackageId, PriceRange, Service,
    ServiceClass, ServiceClassId, ServiceId, Slug,
};

use super::{CatalogStore, CatalogWriter, PgStore, RepositoryError};
use crate::models::{NewPackage, NewPackageFeature, NewService, NewServiceClass};

const PACKAGE_COLUMNS: &str = r"
    p.id, p.service_id, s.name AS service_name, p.package_type,
    p.duration_unit, p.duration_value, p.min_price_usd, p.max_price_usd,
    p.button_type, p.is_active
";

#[derive(sqlx::FromRow)]
struct ServiceClassRow {
    id: ServiceClassId,
    name: String,
    slug: String,
    description: String,
    display_order: i32,
}

impl TryFrom<ServiceClassRow> for ServiceClass {
    type Error = RepositoryError;

    fn try_from(row: ServiceClassRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            slug: parse_slug(&row.slug)?,
            description: row.description,
            display_order: row.display_order,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: ServiceId,
    service_class_id: ServiceClassId,
    name: String,
    slug: String,
    short_description: String,
    detailed_description: String,
}

impl TryFrom<ServiceRow> for Service {
    type Error = RepositoryError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            service_class_id: row.service_class_id,
            name: row.name,
            slug: parse_slug(&row.slug)?,
            short_description: row.short_description,
            detailed_description: row.detailed_description,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PackageRow {
    id: PackageId,
    service_id: ServiceId,
    service_name: String,
    package_type: String,
    duration_unit: String,
    duration_value: String,
    min_price_usd: Decimal,
    max_price_usd: Decimal,
    button_type: String,
    is_active: bool,
}

impl TryFrom<PackageRow> for Package {
    type Error = RepositoryError;

    fn try_from(row: PackageRow) -> Result<Self, Self::Error> {
        let duration_unit = row
            .duration_unit
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("package {}: {e}", row.id)))?;
        let button = row
            .button_type
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("package {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            service_id: row.service_id,
            service_name: row.service_name,
            package_type: row.package_type,
            duration_unit,
            duration_value: row.duration_value,
            price: PriceRange::new(row.min_price_usd, row.max_price_usd),
            button,
            is_active: row.is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PackageFeatureRow {
    id: PackageFeatureId,
    package_id: PackageId,
    feature_text: String,
    display_order: i32,
}

impl From<PackageFeatureRow> for PackageFeature {
    fn from(row: PackageFeatureRow) -> Self {
        Self {
            id: row.id,
            package_id: row.package_id,
            text: row.feature_text,
            display_order: row.display_order,
        }
    }
}

fn parse_slug(raw: &str) -> Result<Slug, RepositoryError> {
    Slug::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid slug {raw:?} in database: {e}")))
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_classes(&self) -> Result<Vec<ServiceClass>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceClassRow>(
            r"
            SELECT id, name, slug, description, display_order
            FROM storefront.service_class
            ORDER BY display_order, name
            ",
        )
        .fetch_all(self.pool())
        .await?;

        collect(rows)
    }

    async fn get_class_by_slug(&self, slug: &str) -> Result<Option<ServiceClass>, RepositoryError> {
        sqlx::query_as::<_, ServiceClassRow>(
            r"
            SELECT id, name, slug, description, display_order
            FROM storefront.service_class
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool())
        .await?
        .map(ServiceClass::try_from)
        .transpose()
    }

    async fn list_services_in_class(
        &self,
        class_id: ServiceClassId,
    ) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceRow>(
            r"
            SELECT id, service_class_id, name, slug, short_description, detailed_description
            FROM storefront.service
            WHERE service_class_id = $1
            ORDER BY name
            ",
        )
        .bind(class_id)
        .fetch_all(self.pool())
        .await?;

        collect(rows)
    }

    async fn get_service_by_slug(
        &self,
        class_slug: &str,
        service_slug: &str,
    ) -> Result<Option<Service>, RepositoryError> {
        sqlx::query_as::<_, ServiceRow>(
            r"
            SELECT s.id, s.service_class_id, s.name, s.slug,
                   s.short_description, s.detailed_description
            FROM storefront.service s
            JOIN storefront.service_class c ON c.id = s.service_class_id
            WHERE s.slug = $1 AND c.slug = $2
            ",
        )
        .bind(service_slug)
        .bind(class_slug)
        .fetch_optional(self.pool())
        .await?
        .map(Service::try_from)
        .transpose()
    }

    async fn list_active_packages(
        &self,
        service_id: ServiceId,
    ) -> Result<Vec<ListedPackage>, RepositoryError> {
        let rows = sqlx::query_as::<_, PackageRow>(&format!(
            r"
            SELECT {PACKAGE_COLUMNS}
            FROM storefront.package p
            JOIN storefront.service s ON s.id = p.service_id
            WHERE p.service_id = $1 AND p.is_active
            ORDER BY p.min_price_usd, p.id
            "
        ))
        .bind(service_id)
        .fetch_all(self.pool())
        .await?;

        let packages: Vec<Package> = collect(rows)?;
        if packages.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = packages.iter().map(|p| p.id.as_i32()).collect();
        let feature_rows = sqlx::query_as::<_, PackageFeatureRow>(
            r"
            SELECT id, package_id, feature_text, display_order
            FROM storefront.package_feature
            WHERE package_id = ANY($1)
            ORDER BY display_order, id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await?;

        let mut features: HashMap<PackageId, Vec<PackageFeature>> = HashMap::new();
        for row in feature_rows {
            features
                .entry(row.package_id)
                .or_default()
                .push(PackageFeature::from(row));
        }

        Ok(packages
            .into_iter()
            .map(|package| ListedPackage {
                features: features.remove(&package.id).unwrap_or_default(),
                package,
            })
            .collect())
    }

    async fn get_package(&self, id: PackageId) -> Result<Option<Package>, RepositoryError> {
        sqlx::query_as::<_, PackageRow>(&format!(
            r"
            SELECT {PACKAGE_COLUMNS}
            FROM storefront.package p
            JOIN storefront.service s ON s.id = p.service_id
            WHERE p.id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .map(Package::try_from)
        .transpose()
    }

    async fn find_packages(&self, ids: &[PackageId]) -> Result<Vec<Package>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = ids.iter().map(PackageId::as_i32).collect();
        let rows = sqlx::query_as::<_, PackageRow>(&format!(
            r"
            SELECT {PACKAGE_COLUMNS}
            FROM storefront.package p
            JOIN storefront.service s ON s.id = p.service_id
            WHERE p.id = ANY($1)
            ORDER BY p.id
            "
        ))
        .bind(&ids)
        .fetch_all(self.pool())
        .await?;

        collect(rows)
    }
}

// =============================================================================
// Catalog administration (used by the CLI seeder)
// =============================================================================

impl CatalogWriter {
    /// Create a service class, deriving its slug from the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or slug is taken, or
    /// `RepositoryError::DataCorruption` if the name yields no slug.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_service_class(
        &mut self,
        input: &NewServiceClass,
    ) -> Result<ServiceClass, RepositoryError> {
        let slug = slug_for(&input.name)?;
        let row = sqlx::query_as::<_, ServiceClassRow>(
            r"
            INSERT INTO storefront.service_class (name, slug, description, display_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, description, display_order
            ",
        )
        .bind(&input.name)
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(input.display_order)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "service class"))?;

        debug!(id = %row.id, slug = %row.slug, "Inserted service class");
        ServiceClass::try_from(row)
    }

    /// Create a service, deriving its slug from the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or slug is taken.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_service(&mut self, input: &NewService) -> Result<Service, RepositoryError> {
        let slug = slug_for(&input.name)?;
        let row = sqlx::query_as::<_, ServiceRow>(
            r"
            INSERT INTO storefront.service
                (service_class_id, name, slug, short_description, detailed_description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, service_class_id, name, slug, short_description, detailed_description
            ",
        )
        .bind(input.service_class_id)
        .bind(&input.name)
        .bind(slug.as_str())
        .bind(&input.short_description)
        .bind(&input.detailed_description)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "service"))?;

        debug!(id = %row.id, slug = %row.slug, "Inserted service");
        Service::try_from(row)
    }

    /// Create a package.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_package(&mut self, input: &NewPackage) -> Result<Package, RepositoryError> {
        let id: PackageId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.package
                (service_id, package_type, duration_unit, duration_value,
                 min_price_usd, max_price_usd, button_type, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(input.service_id)
        .bind(&input.package_type)
        .bind(input.duration_unit.as_str())
        .bind(&input.duration_value)
        .bind(input.price.min)
        .bind(input.price.max)
        .bind(input.button.as_str())
        .bind(input.is_active)
        .fetch_one(&mut *self.tx)
        .await?;

        // Read back through the join so `service_name` is filled in.
        let row = sqlx::query_as::<_, PackageRow>(&format!(
            r"
            SELECT {PACKAGE_COLUMNS}
            FROM storefront.package p
            JOIN storefront.service s ON s.id = p.service_id
            WHERE p.id = $1
            "
        ))
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        Package::try_from(row)
    }

    /// Attach a feature line to a package.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_package_feature(
        &mut self,
        input: &NewPackageFeature,
    ) -> Result<PackageFeature, RepositoryError> {
        let row = sqlx::query_as::<_, PackageFeatureRow>(
            r"
            INSERT INTO storefront.package_feature (package_id, feature_text, display_order)
            VALUES ($1, $2, $3)
            RETURNING id, package_id, feature_text, display_order
            ",
        )
        .bind(input.package_id)
        .bind(&input.text)
        .bind(input.display_order)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(PackageFeature::from(row))
    }

    /// Delete the whole catalog (classes cascade to services, packages and
    /// features). Payment methods and orders are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear_catalog(&mut self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.service_class")
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Derive the slug stored for a new entity.
pub(super) fn slug_for(name: &str) -> Result<Slug, RepositoryError> {
    Slug::from_name(name)
        .map_err(|e| RepositoryError::DataCorruption(format!("cannot derive slug from {name:?}: {e}")))
}
