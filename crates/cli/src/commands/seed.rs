//! Seed the catalog and payment methods from a YAML file.
//!
//! The file mirrors the catalog tree: classes contain services, services
//! contain packages, packages list their feature lines. Payment methods are a
//! flat list next to the classes.
//!
//! ```yaml
//! classes:
//!   - name: Consulting
//!     description: Strategy and advisory work
//!     services:
//!       - name: AI Strategy
//!         short_description: Roadmaps for adopting AI
//!         packages:
//!           - package_type: Starter
//!             duration_unit: month
//!             duration_value: 1 Month
//!             min_price: 1500
//!             max_price: 2000
//!             features:
//!               - Two workshops
//!               - Written roadmap
//! payment_methods:
//!   - name: PayPal
//!     code: paypal
//!     is_enabled: true
//! ```
//!
//! Slugs are derived from names when rows are created.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};

use servicecart_core::{ButtonBehavior, DurationUnit, PriceRange, slugify};
use servicecart_storefront::db::{PgStore, RepositoryError};
use servicecart_storefront::models::{
    NewPackage, NewPackageFeature, NewPaymentMethod, NewService, NewServiceClass,
};

/// Root of a catalog seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub classes: Vec<ClassSeed>,
    #[serde(default)]
    pub payment_methods: Vec<NewPaymentMethod>,
}

#[derive(Debug, Deserialize)]
pub struct ClassSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to the position in the file.
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub services: Vec<ServiceSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceSeed {
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub detailed_description: String,
    #[serde(default)]
    pub packages: Vec<PackageSeed>,
}

#[derive(Debug, Deserialize)]
pub struct PackageSeed {
    pub package_type: String,
    pub duration_unit: DurationUnit,
    pub duration_value: String,
    pub min_price: Decimal,
    /// Defaults to `min_price` (a fixed price).
    #[serde(default)]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub button: ButtonBehavior,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Largest amount a `NUMERIC(10, 2)` price column holds.
const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

const fn default_active() -> bool {
    true
}

impl PackageSeed {
    fn price(&self) -> PriceRange {
        PriceRange::new(self.min_price, self.max_price.unwrap_or(self.min_price))
    }
}

/// Counts of rows written by a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    pub classes: usize,
    pub services: usize,
    pub packages: usize,
    pub features: usize,
    pub payment_methods: usize,
}

/// Check a seed file for problems the database would reject or that would
/// produce a broken catalog.
///
/// Returns one message per problem; an empty list means the seed is usable.
#[must_use]
pub fn validate_seed(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();
    let mut class_slugs = HashSet::new();
    let mut service_slugs = HashSet::new();

    for class in &seed.classes {
        let slug = slugify(&class.name);
        if slug.is_empty() {
            errors.push(format!("Service class name {:?} yields an empty slug", class.name));
        } else if !class_slugs.insert(slug.clone()) {
            errors.push(format!("Duplicate service class slug: {slug}"));
        }

        for service in &class.services {
            let slug = slugify(&service.name);
            if slug.is_empty() {
                errors.push(format!(
                    "Service name {:?} in class '{}' yields an empty slug",
                    service.name, class.name
                ));
            } else if !service_slugs.insert(slug.clone()) {
                errors.push(format!("Duplicate service slug: {slug}"));
            }

            for package in &service.packages {
                let label = format!("{} - {}", package.package_type, service.name);
                if package.package_type.trim().is_empty() {
                    errors.push(format!("Package without a type in service '{}'", service.name));
                }
                if package.min_price < Decimal::ZERO {
                    errors.push(format!("Negative minimum price for package '{label}'"));
                }
                if package.max_price.is_some_and(|max| max < Decimal::ZERO) {
                    errors.push(format!("Negative maximum price for package '{label}'"));
                }
                if package.min_price > MAX_PRICE
                    || package.max_price.is_some_and(|max| max > MAX_PRICE)
                {
                    errors.push(format!("Price above {MAX_PRICE} for package '{label}'"));
                }
                for (i, feature) in package.features.iter().enumerate() {
                    if feature.trim().is_empty() {
                        errors.push(format!("Empty feature at index {i} for package '{label}'"));
                    }
                }
            }
        }
    }

    let mut codes = HashSet::new();
    for method in &seed.payment_methods {
        if method.code.trim().is_empty() {
            errors.push(format!("Payment method '{}' has no code", method.name));
        } else if !codes.insert(method.code.as_str()) {
            errors.push(format!("Duplicate payment method code: {}", method.code));
        }
    }

    errors
}

/// Write a validated seed through the store, optionally clearing first.
///
/// The clear and every insert share one transaction: either the whole file
/// lands or the catalog is left exactly as it was.
///
/// # Errors
///
/// Returns the first `RepositoryError` hit; nothing is committed then.
pub async fn seed_catalog(
    store: &PgStore,
    seed: &CatalogSeed,
    clear_existing: bool,
) -> Result<SeedResult, RepositoryError> {
    let mut writer = store.begin_catalog_write().await?;

    if clear_existing {
        let classes = writer.clear_catalog().await?;
        let methods = writer.clear_payment_methods().await?;
        info!(classes, payment_methods = methods, "Cleared existing catalog");
    }

    let mut result = SeedResult::default();

    for (class_index, class_seed) in seed.classes.iter().enumerate() {
        let class = writer
            .create_service_class(&NewServiceClass {
                name: class_seed.name.clone(),
                description: class_seed.description.clone(),
                display_order: class_seed
                    .display_order
                    .unwrap_or_else(|| position(class_index)),
            })
            .await?;
        result.classes += 1;

        for service_seed in &class_seed.services {
            let service = writer
                .create_service(&NewService {
                    service_class_id: class.id,
                    name: service_seed.name.clone(),
                    short_description: service_seed.short_description.clone(),
                    detailed_description: service_seed.detailed_description.clone(),
                })
                .await?;
            result.services += 1;

            for package_seed in &service_seed.packages {
                let package = writer
                    .create_package(&NewPackage {
                        service_id: service.id,
                        package_type: package_seed.package_type.clone(),
                        duration_unit: package_seed.duration_unit,
                        duration_value: package_seed.duration_value.clone(),
                        price: package_seed.price(),
                        button: package_seed.button,
                        is_active: package_seed.is_active,
                    })
                    .await?;
                result.packages += 1;

                for (feature_index, text) in package_seed.features.iter().enumerate() {
                    writer
                        .create_package_feature(&NewPackageFeature {
                            package_id: package.id,
                            text: text.clone(),
                            display_order: position(feature_index),
                        })
                        .await?;
                    result.features += 1;
                }
            }
        }
    }

    for method in &seed.payment_methods {
        writer.create_payment_method(method).await?;
        result.payment_methods += 1;
    }

    writer.commit().await?;
    Ok(result)
}

fn position(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Seed the catalog from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog file
/// * `clear_existing` - If true, delete the current catalog and payment methods first
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database operation fails.
pub async fn catalog(file_path: &str, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    info!(
        classes = seed.classes.len(),
        payment_methods = seed.payment_methods.len(),
        "Parsed catalog"
    );

    let errors = validate_seed(&seed);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Catalog validated successfully");

    let store = PgStore::new(super::connect().await?);

    info!(clear_existing, "Starting seeding process");
    let result = seed_catalog(&store, &seed, clear_existing).await?;

    info!(
        classes = result.classes,
        services = result.services,
        packages = result.packages,
        features = result.features,
        payment_methods = result.payment_methods,
        "Seeding complete"
    );

    Ok(())
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
classes:
  - name: Consulting
    description: Strategy and advisory work
    services:
      - name: AI Strategy
        short_description: Roadmaps for adopting AI
        packages:
          - package_type: Starter
            duration_unit: month
            duration_value: 1 Month
            min_price: 1500
            max_price: 2000
            features:
              - Two workshops
              - Written roadmap
          - package_type: Enterprise
            duration_unit: project
            duration_value: Custom
            min_price: 0
            button: contact_sales
payment_methods:
  - name: PayPal
    code: paypal
    is_enabled: true
  - name: Bank Transfer
    code: bank
";

    fn parse(yaml: &str) -> CatalogSeed {
        serde_yaml::from_str(yaml).expect("Failed to parse YAML")
    }

    #[test]
    fn test_parse_sample() {
        let seed = parse(SAMPLE);
        assert_eq!(seed.classes.len(), 1);

        let service = &seed.classes[0].services[0];
        assert_eq!(service.name, "AI Strategy");
        assert_eq!(service.detailed_description, "");

        let starter = &service.packages[0];
        assert_eq!(starter.duration_unit, DurationUnit::Month);
        assert_eq!(starter.button, ButtonBehavior::AddToCart);
        assert!(starter.is_active);
        assert_eq!(
            starter.price(),
            PriceRange::new(Decimal::from(1500), Decimal::from(2000))
        );
        assert_eq!(starter.features.len(), 2);

        let enterprise = &service.packages[1];
        assert_eq!(enterprise.button, ButtonBehavior::ContactSales);
        assert!(enterprise.price().is_fixed());

        assert_eq!(seed.payment_methods.len(), 2);
        assert!(seed.payment_methods[0].is_enabled);
        assert!(!seed.payment_methods[1].is_enabled);
        assert!(seed.payment_methods[1].is_visible);
    }

    #[test]
    fn test_sample_is_valid() {
        assert!(validate_seed(&parse(SAMPLE)).is_empty());
    }

    #[test]
    fn test_unknown_duration_unit_is_rejected() {
        let yaml = r"
classes:
  - name: Consulting
    services:
      - name: Audit
        packages:
          - package_type: Basic
            duration_unit: fortnight
            duration_value: 2 Weeks
            min_price: 10
";
        assert!(serde_yaml::from_str::<CatalogSeed>(yaml).is_err());
    }

    #[test]
    fn test_validate_reports_problems() {
        let yaml = r"
classes:
  - name: Consulting
    services:
      - name: Audit
        packages:
          - package_type: ' '
            duration_unit: one_time
            duration_value: Once
            min_price: -5
            features: ['']
  - name: consulting
    services:
      - name: AUDIT
payment_methods:
  - name: PayPal
    code: paypal
  - name: PayPal Express
    code: paypal
  - name: Cash
    code: ''
";
        let errors = validate_seed(&parse(yaml));

        assert!(errors.iter().any(|e| e.contains("Duplicate service class slug: consulting")));
        assert!(errors.iter().any(|e| e.contains("Duplicate service slug: audit")));
        assert!(errors.iter().any(|e| e.contains("Package without a type")));
        assert!(errors.iter().any(|e| e.contains("Negative minimum price")));
        assert!(errors.iter().any(|e| e.contains("Empty feature at index 0")));
        assert!(errors.iter().any(|e| e.contains("Duplicate payment method code: paypal")));
        assert!(errors.iter().any(|e| e.contains("'Cash' has no code")));
    }

    #[test]
    fn test_price_beyond_column_range_is_reported() {
        assert_eq!(MAX_PRICE.to_string(), "99999999.99");

        let yaml = r"
classes:
  - name: Consulting
    services:
      - name: Audit
        packages:
          - package_type: Huge
            duration_unit: year
            duration_value: 1 Year
            min_price: 100
            max_price: 100000000
";
        let errors = validate_seed(&parse(yaml));
        assert_eq!(errors, vec![
            "Price above 99999999.99 for package 'Huge - Audit'".to_string()
        ]);
    }

    #[test]
    fn test_empty_slug_is_reported() {
        let seed = parse("classes:\n  - name: '!!!'\n");
        assert_eq!(validate_seed(&seed), vec![
            "Service class name \"!!!\" yields an empty slug".to_string()
        ]);
    }
}
