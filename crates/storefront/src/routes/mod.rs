//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Catalog index
//! GET  /services/{class_slug}/             - Service class detail
//! GET  /services/{class_slug}/{slug}/      - Service detail with packages
//!
//! # Cart
//! GET  /cart/                              - Cart page
//! POST /cart/add/{package_id}/             - Add one unit, back to referring page
//! POST /cart/remove/{package_id}/          - Remove entry, back to cart
//!
//! # Checkout
//! GET  /checkout/payment/                  - Payment method selection
//! POST /checkout/payment/                  - Place order
//! GET  /checkout/complete/                 - Confirmation page
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::Result;
use crate::services;
use crate::state::AppState;

/// Values every page layout needs.
#[derive(Clone)]
pub struct Layout {
    pub site_name: String,
    /// Units in the cart, for the header badge.
    pub cart_count: u32,
}

impl Layout {
    /// Build the layout for the current visitor.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cart` if the session cannot be read.
    pub async fn load(state: &AppState, session: &Session) -> Result<Self> {
        Ok(Self {
            site_name: state.config().site_name.clone(),
            cart_count: services::cart::item_count(state.store(), session).await?,
        })
    }
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/{class_slug}/", get(catalog::class_detail))
        .route("/{class_slug}/{service_slug}/", get(catalog::service_detail))
}

/// Create the cart mutation routes router.
///
/// The cart page itself is registered in [`routes`]: a nested `/` only
/// matches `/cart`, not `/cart/`.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add/{package_id}/", post(cart::add))
        .route("/remove/{package_id}/", post(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/payment/",
            get(checkout::payment_page).post(checkout::submit_payment),
        )
        .route("/complete/", get(checkout::complete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .nest("/services", catalog_routes())
        .route("/cart/", get(cart::show))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}
