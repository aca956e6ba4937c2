//! Cart operations on top of the visitor session.
//!
//! The cart is stored in the session under [`session_keys::CART`] as a
//! [`Cart`]. Nothing here caches prices: every read joins the cart against
//! the catalog, and entries whose package has been deleted are pruned from
//! the session as a side effect.

use std::collections::HashMap;

use thiserror::Error;
use tower_sessions::Session;
use tracing::{debug, instrument};

use servicecart_core::{Cart, LineItem, PackageId, PriceRange, PricedCart};

use crate::db::{CatalogStore, RepositoryError};
use crate::models::session_keys;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session store error.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session (empty if none yet).
///
/// # Errors
///
/// Returns `CartError::Session` if the session store fails or the stored
/// value does not deserialize.
pub async fn load(session: &Session) -> Result<Cart, CartError> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Write the cart back to the session.
///
/// # Errors
///
/// Returns `CartError::Session` if the session store fails.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), CartError> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Remove the cart from the session.
///
/// # Errors
///
/// Returns `CartError::Session` if the session store fails.
pub async fn clear(session: &Session) -> Result<(), CartError> {
    session.remove_value(session_keys::CART).await?;
    Ok(())
}

/// Total number of units in the cart, for the header badge.
///
/// Counts only entries whose package still exists; stale entries are pruned
/// exactly as [`price_cart`] does.
///
/// # Errors
///
/// See [`price_cart`].
pub async fn item_count<S>(store: &S, session: &Session) -> Result<u32, CartError>
where
    S: CatalogStore + ?Sized,
{
    Ok(price_cart(store, session).await?.item_count())
}

// =============================================================================
// Cart Mutations
// =============================================================================

/// Add one unit of a package to the cart.
///
/// Unknown packages, inactive packages and packages whose button is not
/// add-to-cart are ignored. Returns whether the cart changed.
///
/// # Errors
///
/// Returns `CartError` if the catalog lookup or the session store fails.
#[instrument(skip(store, session))]
pub async fn add_package<S>(store: &S, session: &Session, id: PackageId) -> Result<bool, CartError>
where
    S: CatalogStore + ?Sized,
{
    let Some(package) = store.get_package(id).await? else {
        debug!("Ignoring add of unknown package");
        return Ok(false);
    };

    let mut cart = load(session).await?;
    if !cart.add(&package) {
        debug!(button = %package.button, active = package.is_active, "Package not purchasable");
        return Ok(false);
    }

    save(session, &cart).await?;
    Ok(true)
}

/// Remove a package's entry entirely. Returns whether it was present.
///
/// # Errors
///
/// Returns `CartError::Session` if the session store fails.
#[instrument(skip(session))]
pub async fn remove_package(session: &Session, id: PackageId) -> Result<bool, CartError> {
    let mut cart = load(session).await?;
    if !cart.remove(id) {
        return Ok(false);
    }
    save(session, &cart).await?;
    Ok(true)
}

// =============================================================================
// Pricing
// =============================================================================

/// Price the session cart against the current catalog.
///
/// Entries whose package no longer exists are dropped, and the pruned cart
/// is written back to the session only when something was dropped.
///
/// # Errors
///
/// Returns `CartError` if the catalog lookup or the session store fails.
pub async fn price_cart<S>(store: &S, session: &Session) -> Result<PricedCart, CartError>
where
    S: CatalogStore + ?Sized,
{
    let mut cart = load(session).await?;
    if cart.is_empty() {
        return Ok(PricedCart::default());
    }

    let packages: HashMap<PackageId, _> = store
        .find_packages(&cart.package_ids())
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let priced = cart.price(&packages);
    if !priced.pruned.is_empty() {
        debug!(pruned = ?priced.pruned, "Pruned stale cart entries");
        save(session, &cart).await?;
    }
    Ok(priced)
}

/// Minimum and maximum cart totals.
///
/// # Errors
///
/// See [`price_cart`].
pub async fn compute_totals<S>(store: &S, session: &Session) -> Result<PriceRange, CartError>
where
    S: CatalogStore + ?Sized,
{
    Ok(price_cart(store, session).await?.totals)
}

/// Cart entries joined with their packages, for display.
///
/// # Errors
///
/// See [`price_cart`].
pub async fn materialize_line_items<S>(
    store: &S,
    session: &Session,
) -> Result<Vec<LineItem>, CartError>
where
    S: CatalogStore + ?Sized,
{
    Ok(price_cart(store, session).await?.lines)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use servicecart_core::{ButtonBehavior, DurationUnit, Package, ServiceId};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewPackage, NewService, NewServiceClass};

    pub(crate) fn new_session() -> Session {
        Session::new(None, Arc::new(tower_sessions::MemoryStore::default()), None)
    }

    pub(crate) fn seed_service(store: &MemoryStore) -> ServiceId {
        let class = store
            .insert_service_class(NewServiceClass {
                name: "Consulting".to_string(),
                description: String::new(),
                display_order: 0,
            })
            .unwrap();
        store
            .insert_service(NewService {
                service_class_id: class.id,
                name: "AI Strategy".to_string(),
                short_description: String::new(),
                detailed_description: String::new(),
            })
            .unwrap()
            .id
    }

    pub(crate) fn seed_package(
        store: &MemoryStore,
        service_id: ServiceId,
        min: i64,
        max: i64,
        button: ButtonBehavior,
    ) -> Package {
        store
            .insert_package(NewPackage {
                service_id,
                package_type: "Standard".to_string(),
                duration_unit: DurationUnit::Project,
                duration_value: "1 Project".to_string(),
                price: PriceRange::new(Decimal::new(min, 0), Decimal::new(max, 0)),
                button,
                is_active: true,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_price() {
        let store = MemoryStore::new();
        let service = seed_service(&store);
        let a = seed_package(&store, service, 100, 150, ButtonBehavior::AddToCart);
        let b = seed_package(&store, service, 50, 50, ButtonBehavior::AddToCart);
        let session = new_session();

        assert!(add_package(&store, &session, a.id).await.unwrap());
        assert!(add_package(&store, &session, a.id).await.unwrap());
        assert!(add_package(&store, &session, b.id).await.unwrap());

        let totals = compute_totals(&store, &session).await.unwrap();
        assert_eq!(totals.min, Decimal::new(250, 0));
        assert_eq!(totals.max, Decimal::new(350, 0));
        assert_eq!(item_count(&store, &session).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_add_ignores_unknown_and_non_cart_packages() {
        let store = MemoryStore::new();
        let service = seed_service(&store);
        let contact = seed_package(&store, service, 10, 10, ButtonBehavior::ContactSales);
        let inactive = seed_package(&store, service, 10, 10, ButtonBehavior::AddToCart);
        store.set_package_active(inactive.id, false);
        let session = new_session();

        assert!(!add_package(&store, &session, contact.id).await.unwrap());
        assert!(!add_package(&store, &session, inactive.id).await.unwrap());
        assert!(!add_package(&store, &session, PackageId::new(999)).await.unwrap());
        assert!(load(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_package() {
        let store = MemoryStore::new();
        let service = seed_service(&store);
        let p = seed_package(&store, service, 10, 20, ButtonBehavior::AddToCart);
        let session = new_session();

        add_package(&store, &session, p.id).await.unwrap();
        assert!(!remove_package(&session, PackageId::new(999)).await.unwrap());
        assert!(remove_package(&session, p.id).await.unwrap());
        assert!(load(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pricing_prunes_deleted_packages_from_session() {
        let store = MemoryStore::new();
        let service = seed_service(&store);
        let kept = seed_package(&store, service, 10, 20, ButtonBehavior::AddToCart);
        let gone = seed_package(&store, service, 30, 40, ButtonBehavior::AddToCart);
        let session = new_session();
        add_package(&store, &session, kept.id).await.unwrap();
        add_package(&store, &session, gone.id).await.unwrap();

        store.delete_package(gone.id);
        let lines = materialize_line_items(&store, &session).await.unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].package.id, kept.id);
        assert_eq!(load(&session).await.unwrap().package_ids(), vec![kept.id]);
    }

    #[tokio::test]
    async fn test_item_count_skips_deleted_packages() {
        let store = MemoryStore::new();
        let service = seed_service(&store);
        let kept = seed_package(&store, service, 10, 20, ButtonBehavior::AddToCart);
        let gone = seed_package(&store, service, 30, 40, ButtonBehavior::AddToCart);
        let session = new_session();
        add_package(&store, &session, kept.id).await.unwrap();
        add_package(&store, &session, gone.id).await.unwrap();
        add_package(&store, &session, gone.id).await.unwrap();
        assert_eq!(item_count(&store, &session).await.unwrap(), 3);

        store.delete_package(gone.id);
        assert_eq!(item_count(&store, &session).await.unwrap(), 1);
        assert_eq!(load(&session).await.unwrap().package_ids(), vec![kept.id]);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryStore::new();
        let service = seed_service(&store);
        let p = seed_package(&store, service, 10, 20, ButtonBehavior::AddToCart);
        let session = new_session();
        add_package(&store, &session, p.id).await.unwrap();

        clear(&session).await.unwrap();
        assert_eq!(item_count(&store, &session).await.unwrap(), 0);
    }
}
