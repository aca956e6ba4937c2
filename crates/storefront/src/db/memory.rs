//! In-memory store for tests and local experiments.
//!
//! Mirrors the `PostgreSQL` constraints that matter to the storefront:
//! unique names, slugs and payment codes, cascading package deletes and
//! ordering rules. Everything sits behind one `RwLock`.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use servicecart_core::{
    ListedPackage, Order, OrderId, Package, PackageFeature, PackageFeatureId, PackageId,
    PaymentMethod, PaymentMethodId, Service, ServiceClass, ServiceClassId, ServiceId,
};

use super::catalog::slug_for;
use super::{CatalogStore, OrderStore, PaymentMethodStore, RepositoryError, Store};
use crate::models::{
    NewPackage, NewPackageFeature, NewPaymentMethod, NewService, NewServiceClass,
};

#[derive(Debug, Default)]
struct Tables {
    classes: Vec<ServiceClass>,
    services: Vec<Service>,
    packages: Vec<Package>,
    features: Vec<PackageFeature>,
    payment_methods: Vec<PaymentMethod>,
    orders: Vec<Order>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// A [`Store`] that keeps every table in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a service class.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate name or slug.
    pub fn insert_service_class(
        &self,
        input: NewServiceClass,
    ) -> Result<ServiceClass, RepositoryError> {
        let slug = slug_for(&input.name)?;
        let mut tables = self.write();
        if tables
            .classes
            .iter()
            .any(|c| c.name == input.name || c.slug == slug)
        {
            return Err(RepositoryError::Conflict(
                "service class already exists".to_string(),
            ));
        }

        let class = ServiceClass {
            id: ServiceClassId::new(tables.next_id()),
            name: input.name,
            slug,
            description: input.description,
            display_order: input.display_order,
        };
        tables.classes.push(class.clone());
        Ok(class)
    }

    /// Insert a service under an existing class.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the class does not exist and
    /// `RepositoryError::Conflict` on a duplicate name or slug.
    pub fn insert_service(&self, input: NewService) -> Result<Service, RepositoryError> {
        let slug = slug_for(&input.name)?;
        let mut tables = self.write();
        if !tables.classes.iter().any(|c| c.id == input.service_class_id) {
            return Err(RepositoryError::NotFound);
        }
        if tables
            .services
            .iter()
            .any(|s| s.name == input.name || s.slug == slug)
        {
            return Err(RepositoryError::Conflict("service already exists".to_string()));
        }

        let service = Service {
            id: ServiceId::new(tables.next_id()),
            service_class_id: input.service_class_id,
            name: input.name,
            slug,
            short_description: input.short_description,
            detailed_description: input.detailed_description,
        };
        tables.services.push(service.clone());
        Ok(service)
    }

    /// Insert a package under an existing service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service does not exist.
    pub fn insert_package(&self, input: NewPackage) -> Result<Package, RepositoryError> {
        let mut tables = self.write();
        let service_name = tables
            .services
            .iter()
            .find(|s| s.id == input.service_id)
            .map(|s| s.name.clone())
            .ok_or(RepositoryError::NotFound)?;

        let package = Package {
            id: PackageId::new(tables.next_id()),
            service_id: input.service_id,
            service_name,
            package_type: input.package_type,
            duration_unit: input.duration_unit,
            duration_value: input.duration_value,
            price: input.price,
            button: input.button,
            is_active: input.is_active,
        };
        tables.packages.push(package.clone());
        Ok(package)
    }

    /// Attach a feature line to an existing package.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the package does not exist.
    pub fn insert_package_feature(
        &self,
        input: NewPackageFeature,
    ) -> Result<PackageFeature, RepositoryError> {
        let mut tables = self.write();
        if !tables.packages.iter().any(|p| p.id == input.package_id) {
            return Err(RepositoryError::NotFound);
        }

        let feature = PackageFeature {
            id: PackageFeatureId::new(tables.next_id()),
            package_id: input.package_id,
            text: input.text,
            display_order: input.display_order,
        };
        tables.features.push(feature.clone());
        Ok(feature)
    }

    /// Insert a payment method.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate name or code.
    pub fn insert_payment_method(
        &self,
        input: NewPaymentMethod,
    ) -> Result<PaymentMethod, RepositoryError> {
        let mut tables = self.write();
        if tables
            .payment_methods
            .iter()
            .any(|m| m.name == input.name || m.code == input.code)
        {
            return Err(RepositoryError::Conflict(
                "payment method already exists".to_string(),
            ));
        }

        let method = PaymentMethod {
            id: PaymentMethodId::new(tables.next_id()),
            name: input.name,
            code: input.code,
            is_enabled: input.is_enabled,
            is_visible: input.is_visible,
            sort_order: input.sort_order,
        };
        tables.payment_methods.push(method.clone());
        Ok(method)
    }

    /// Toggle a package's active flag. Returns whether the package exists.
    pub fn set_package_active(&self, id: PackageId, active: bool) -> bool {
        let mut tables = self.write();
        let Some(package) = tables.packages.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        package.is_active = active;
        true
    }

    /// Delete a package and its features. Returns whether it existed.
    pub fn delete_package(&self, id: PackageId) -> bool {
        let mut tables = self.write();
        let before = tables.packages.len();
        tables.packages.retain(|p| p.id != id);
        tables.features.retain(|f| f.package_id != id);
        tables.packages.len() != before
    }

    /// Snapshot of every order in insertion order.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.read().orders.clone()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_classes(&self) -> Result<Vec<ServiceClass>, RepositoryError> {
        let mut classes = self.read().classes.clone();
        classes.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(classes)
    }

    async fn get_class_by_slug(&self, slug: &str) -> Result<Option<ServiceClass>, RepositoryError> {
        Ok(self
            .read()
            .classes
            .iter()
            .find(|c| c.slug.as_str() == slug)
            .cloned())
    }

    async fn list_services_in_class(
        &self,
        class_id: ServiceClassId,
    ) -> Result<Vec<Service>, RepositoryError> {
        let mut services: Vec<Service> = self
            .read()
            .services
            .iter()
            .filter(|s| s.service_class_id == class_id)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get_service_by_slug(
        &self,
        class_slug: &str,
        service_slug: &str,
    ) -> Result<Option<Service>, RepositoryError> {
        let tables = self.read();
        let Some(class) = tables.classes.iter().find(|c| c.slug.as_str() == class_slug) else {
            return Ok(None);
        };
        Ok(tables
            .services
            .iter()
            .find(|s| s.slug.as_str() == service_slug && s.service_class_id == class.id)
            .cloned())
    }

    async fn list_active_packages(
        &self,
        service_id: ServiceId,
    ) -> Result<Vec<ListedPackage>, RepositoryError> {
        let tables = self.read();
        let mut packages: Vec<Package> = tables
            .packages
            .iter()
            .filter(|p| p.service_id == service_id && p.is_active)
            .cloned()
            .collect();
        packages.sort_by(|a, b| a.price.min.cmp(&b.price.min).then_with(|| a.id.cmp(&b.id)));

        Ok(packages
            .into_iter()
            .map(|package| {
                let mut features: Vec<PackageFeature> = tables
                    .features
                    .iter()
                    .filter(|f| f.package_id == package.id)
                    .cloned()
                    .collect();
                features.sort_by_key(|f| (f.display_order, f.id));
                ListedPackage { package, features }
            })
            .collect())
    }

    async fn get_package(&self, id: PackageId) -> Result<Option<Package>, RepositoryError> {
        Ok(self.read().packages.iter().find(|p| p.id == id).cloned())
    }

    async fn find_packages(&self, ids: &[PackageId]) -> Result<Vec<Package>, RepositoryError> {
        let wanted: HashSet<PackageId> = ids.iter().copied().collect();
        let mut packages: Vec<Package> = self
            .read()
            .packages
            .iter()
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect();
        packages.sort_by_key(|p| p.id);
        Ok(packages)
    }
}

#[async_trait]
impl PaymentMethodStore for MemoryStore {
    async fn list_visible_payment_methods(&self) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let mut methods: Vec<PaymentMethod> = self
            .read()
            .payment_methods
            .iter()
            .filter(|m| m.is_visible)
            .cloned()
            .collect();
        methods.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(methods)
    }

    async fn get_payment_method_by_code(
        &self,
        code: &str,
    ) -> Result<Option<PaymentMethod>, RepositoryError> {
        Ok(self
            .read()
            .payment_methods
            .iter()
            .find(|m| m.code == code)
            .cloned())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(
        &self,
        session_key: &str,
        total_amount: Decimal,
    ) -> Result<Order, RepositoryError> {
        let mut tables = self.write();
        let order = Order {
            id: OrderId::new(tables.next_id()),
            session_key: session_key.to_string(),
            total_amount,
            created_at: Utc::now(),
        };
        tables.orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.read().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_recent_orders(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .read()
            .orders
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use servicecart_core::{ButtonBehavior, DurationUnit, PriceRange};

    use super::*;

    fn class(store: &MemoryStore, name: &str, order: i32) -> ServiceClass {
        store
            .insert_service_class(NewServiceClass {
                name: name.to_string(),
                description: String::new(),
                display_order: order,
            })
            .unwrap()
    }

    fn service(store: &MemoryStore, class_id: ServiceClassId, name: &str) -> Service {
        store
            .insert_service(NewService {
                service_class_id: class_id,
                name: name.to_string(),
                short_description: String::new(),
                detailed_description: String::new(),
            })
            .unwrap()
    }

    fn package(store: &MemoryStore, service_id: ServiceId, min: i64, active: bool) -> Package {
        store
            .insert_package(NewPackage {
                service_id,
                package_type: format!("From {min}"),
                duration_unit: DurationUnit::Month,
                duration_value: "1 Month".to_string(),
                price: PriceRange::new(Decimal::new(min, 0), Decimal::new(min * 2, 0)),
                button: ButtonBehavior::AddToCart,
                is_active: active,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_classes_ordered_by_display_order_then_name() {
        let store = MemoryStore::new();
        class(&store, "Support", 2);
        class(&store, "Consulting", 1);
        class(&store, "Audits", 2);

        let names: Vec<String> = store
            .list_classes()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Consulting", "Audits", "Support"]);
    }

    #[tokio::test]
    async fn test_slug_derived_from_name() {
        let store = MemoryStore::new();
        let c = class(&store, "Managed Cloud & DevOps", 0);
        assert_eq!(c.slug.as_str(), "managed-cloud-devops");
        assert!(store.get_class_by_slug("managed-cloud-devops").await.unwrap().is_some());
    }

    #[test]
    fn test_duplicate_class_name_conflicts() {
        let store = MemoryStore::new();
        class(&store, "Consulting", 0);
        let err = store
            .insert_service_class(NewServiceClass {
                name: "Consulting".to_string(),
                description: String::new(),
                display_order: 0,
            })
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_service_only_resolves_under_own_class() {
        let store = MemoryStore::new();
        let consulting = class(&store, "Consulting", 0);
        class(&store, "Support", 1);
        service(&store, consulting.id, "AI Strategy");

        assert!(
            store
                .get_service_by_slug("consulting", "ai-strategy")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            store
                .get_service_by_slug("support", "ai-strategy")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .get_service_by_slug("missing", "ai-strategy")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_active_packages_sorted_with_features() {
        let store = MemoryStore::new();
        let c = class(&store, "Consulting", 0);
        let s = service(&store, c.id, "AI Strategy");
        let expensive = package(&store, s.id, 900, true);
        let cheap = package(&store, s.id, 100, true);
        package(&store, s.id, 50, false);

        for (order, text) in [(2, "Second"), (1, "First")] {
            store
                .insert_package_feature(NewPackageFeature {
                    package_id: cheap.id,
                    text: text.to_string(),
                    display_order: order,
                })
                .unwrap();
        }

        let listed = store.list_active_packages(s.id).await.unwrap();
        let ids: Vec<PackageId> = listed.iter().map(|l| l.package.id).collect();
        assert_eq!(ids, [cheap.id, expensive.id]);

        let texts: Vec<&str> = listed[0].features.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, ["First", "Second"]);
        assert!(listed[1].features.is_empty());
    }

    #[tokio::test]
    async fn test_find_packages_includes_inactive_and_skips_deleted() {
        let store = MemoryStore::new();
        let c = class(&store, "Consulting", 0);
        let s = service(&store, c.id, "AI Strategy");
        let inactive = package(&store, s.id, 10, false);
        let deleted = package(&store, s.id, 20, true);
        assert!(store.delete_package(deleted.id));

        let found = store.find_packages(&[inactive.id, deleted.id]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, inactive.id);
    }

    #[tokio::test]
    async fn test_visible_payment_methods_sorted() {
        let store = MemoryStore::new();
        for (name, code, visible, sort) in [
            ("PayPal", "paypal", true, 2),
            ("Hidden", "hidden", false, 0),
            ("Bank Transfer", "dbt", true, 1),
        ] {
            store
                .insert_payment_method(NewPaymentMethod {
                    name: name.to_string(),
                    code: code.to_string(),
                    is_enabled: true,
                    is_visible: visible,
                    sort_order: sort,
                })
                .unwrap();
        }

        let codes: Vec<String> = store
            .list_visible_payment_methods()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.code)
            .collect();
        assert_eq!(codes, ["dbt", "paypal"]);
        assert!(store.get_payment_method_by_code("hidden").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_orders_listed_newest_first() {
        let store = MemoryStore::new();
        let first = store.create_order("a", Decimal::new(100, 0)).await.unwrap();
        let second = store.create_order("b", Decimal::new(200, 0)).await.unwrap();

        let recent = store.list_recent_orders(10).await.unwrap();
        assert_eq!(recent, vec![second.clone(), first]);
        assert_eq!(store.list_recent_orders(1).await.unwrap(), vec![second]);
        assert!(store.list_recent_orders(-1).await.unwrap().is_empty());
    }
}
