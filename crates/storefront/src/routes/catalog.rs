//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use servicecart_core::{ButtonBehavior, ListedPackage, Service, ServiceClass};

use super::Layout;
use crate::db::CatalogStore;
use crate::error::{AppError, Result};
use crate::filters;
use crate::services;
use crate::state::AppState;

/// Link to a service for listings.
#[derive(Clone)]
pub struct ServiceLinkView {
    pub name: String,
    pub url: String,
    pub short_description: String,
}

impl ServiceLinkView {
    fn new(class: &ServiceClass, service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            url: service_url(class, service),
            short_description: service.short_description.clone(),
        }
    }
}

/// Service class with its services.
#[derive(Clone)]
pub struct ClassView {
    pub name: String,
    pub url: String,
    pub description: String,
    pub services: Vec<ServiceLinkView>,
}

/// Package display data for templates.
#[derive(Clone)]
pub struct PackageView {
    pub id: i32,
    pub package_type: String,
    pub duration: String,
    pub duration_unit: &'static str,
    pub price: String,
    pub features: Vec<String>,
    /// `show_price`, `add_to_cart` or `contact_sales`.
    pub button: &'static str,
    pub can_add: bool,
    /// Quantity already in the visitor's cart.
    pub in_cart: u32,
}

impl PackageView {
    fn new(listed: &ListedPackage, in_cart: u32) -> Self {
        let package = &listed.package;
        Self {
            id: package.id.as_i32(),
            package_type: package.package_type.clone(),
            duration: package.duration_value.clone(),
            duration_unit: package.duration_unit.label(),
            price: package.display_price(),
            features: listed.features.iter().map(|f| f.text.clone()).collect(),
            button: package.button.as_str(),
            can_add: package.can_add_to_cart(),
            in_cart,
        }
    }

    /// Whether the buyer is told to get in touch instead of buying.
    #[must_use]
    pub fn contact_sales(&self) -> bool {
        self.button == ButtonBehavior::ContactSales.as_str()
    }
}

/// Catalog index template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogIndexTemplate {
    pub layout: Layout,
    pub classes: Vec<ClassView>,
}

/// Service class detail template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/class.html")]
pub struct ClassDetailTemplate {
    pub layout: Layout,
    pub class: ClassView,
}

/// Service detail template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/service.html")]
pub struct ServiceDetailTemplate {
    pub layout: Layout,
    pub class_name: String,
    pub class_url: String,
    pub name: String,
    pub short_description: String,
    pub detailed_description: String,
    pub packages: Vec<PackageView>,
}

fn class_url(class: &ServiceClass) -> String {
    format!("/services/{}/", class.slug)
}

fn service_url(class: &ServiceClass, service: &Service) -> String {
    format!("/services/{}/{}/", class.slug, service.slug)
}

async fn class_view(state: &AppState, class: &ServiceClass) -> Result<ClassView> {
    let services = state.store().list_services_in_class(class.id).await?;
    Ok(ClassView {
        name: class.name.clone(),
        url: class_url(class),
        description: class.description.clone(),
        services: services
            .iter()
            .map(|s| ServiceLinkView::new(class, s))
            .collect(),
    })
}

/// Display the catalog index: every class with its services.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let mut classes = Vec::new();
    for class in state.store().list_classes().await? {
        classes.push(class_view(&state, &class).await?);
    }

    Ok(CatalogIndexTemplate {
        layout: Layout::load(&state, &session).await?,
        classes,
    })
}

/// Display one service class.
#[instrument(skip(state, session))]
pub async fn class_detail(
    State(state): State<AppState>,
    session: Session,
    Path(class_slug): Path<String>,
) -> Result<impl IntoResponse> {
    let class = state
        .store()
        .get_class_by_slug(&class_slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service class {class_slug}")))?;

    Ok(ClassDetailTemplate {
        layout: Layout::load(&state, &session).await?,
        class: class_view(&state, &class).await?,
    })
}

/// Display a service with its active packages.
///
/// The service must belong to the class named in the path.
#[instrument(skip(state, session))]
pub async fn service_detail(
    State(state): State<AppState>,
    session: Session,
    Path((class_slug, service_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let not_found = || AppError::NotFound(format!("service {class_slug}/{service_slug}"));

    let class = state
        .store()
        .get_class_by_slug(&class_slug)
        .await?
        .ok_or_else(not_found)?;
    let service = state
        .store()
        .get_service_by_slug(&class_slug, &service_slug)
        .await?
        .ok_or_else(not_found)?;

    let cart = services::cart::load(&session).await?;
    let packages = state
        .store()
        .list_active_packages(service.id)
        .await?
        .iter()
        .map(|listed| PackageView::new(listed, cart.quantity(listed.package.id)))
        .collect();

    Ok(ServiceDetailTemplate {
        layout: Layout::load(&state, &session).await?,
        class_name: class.name.clone(),
        class_url: class_url(&class),
        name: service.name,
        short_description: service.short_description,
        detailed_description: service.detailed_description,
        packages,
    })
}
