//! Cart route handlers.
//!
//! The cart lives in the visitor session. Adding and removing are plain
//! form posts answered with a 303 redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;
use tracing::instrument;
use url::Url;

use servicecart_core::{LineItem, PackageId, PricedCart};

use super::Layout;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::services;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub package_id: i32,
    pub title: String,
    pub duration: String,
    pub duration_unit: &'static str,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&LineItem> for CartLineView {
    fn from(line: &LineItem) -> Self {
        Self {
            package_id: line.package.id.as_i32(),
            title: line.package.title(),
            duration: line.package.duration_value.clone(),
            duration_unit: line.package.duration_unit.label(),
            unit_price: line.package.display_price(),
            quantity: line.quantity,
            line_total: line.line_total.display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    /// Total as a single price or a range.
    pub total: String,
    /// Amount charged at checkout.
    pub charge: String,
    pub is_range: bool,
}

impl From<&PricedCart> for CartView {
    fn from(priced: &PricedCart) -> Self {
        Self {
            lines: priced.lines.iter().map(CartLineView::from).collect(),
            total: priced.totals.display(),
            charge: servicecart_core::format_usd(priced.charge_amount(), 2),
            is_range: !priced.totals.is_fixed(),
        }
    }
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let priced = services::cart::price_cart(state.store(), &session).await?;

    Ok(CartShowTemplate {
        layout: Layout::load(&state, &session).await?,
        cart: CartView::from(&priced),
    })
}

/// Add one unit of a package, then go back where the visitor came from.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    package_id: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Redirect> {
    let package_id = package_id_from(package_id)?;
    if services::cart::add_package(state.store(), &session, package_id).await? {
        let id = package_id.to_string();
        add_breadcrumb("cart", "Added package", Some(&[("package_id", id.as_str())]));
    }

    let target = same_origin_referer(&headers, &state.config().base_url)
        .unwrap_or_else(|| "/".to_string());
    Ok(Redirect::to(&target))
}

/// Remove a package's entry, then show the cart.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    package_id: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Redirect> {
    services::cart::remove_package(&session, package_id_from(package_id)?).await?;
    Ok(Redirect::to("/cart/"))
}

/// A package id segment that is not an `i32` names no package.
fn package_id_from(path: std::result::Result<Path<i32>, PathRejection>) -> Result<PackageId> {
    path.map(|Path(id)| PackageId::new(id)).map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Unparseable package id");
        AppError::NotFound("package".to_string())
    })
}

/// Path and query of the `Referer` header when it points at our own site.
fn same_origin_referer(headers: &HeaderMap, base_url: &str) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let referer = Url::parse(referer).ok()?;
    let base = Url::parse(base_url).ok()?;

    if referer.origin() != base.origin() {
        return None;
    }

    let mut target = referer.path().to_string();
    if let Some(query) = referer.query() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn with_referer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_str(value).unwrap());
        headers
    }

    const BASE: &str = "https://services.example.com";

    #[test]
    fn test_same_origin_referer_is_followed() {
        let headers = with_referer("https://services.example.com/services/consulting/ai/?tab=1");
        assert_eq!(
            same_origin_referer(&headers, BASE).as_deref(),
            Some("/services/consulting/ai/?tab=1")
        );
    }

    #[test]
    fn test_foreign_referer_is_ignored() {
        for referer in [
            "https://evil.example.net/phish",
            "http://services.example.com/",
            "https://services.example.com:8443/",
            "not a url",
        ] {
            assert_eq!(same_origin_referer(&with_referer(referer), BASE), None, "{referer}");
        }
    }

    #[test]
    fn test_missing_referer() {
        assert_eq!(same_origin_referer(&HeaderMap::new(), BASE), None);
    }
}
