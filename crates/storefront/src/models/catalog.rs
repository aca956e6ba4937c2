//! Inputs for creating catalog entries.
//!
//! Slugs are not part of any input: the store derives them from the name
//! when the row is created and never rewrites them.

use serde::Deserialize;

use servicecart_core::{
    ButtonBehavior, DurationUnit, PackageId, PriceRange, ServiceClassId, ServiceId,
};

/// A new top-level category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceClass {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display_order: i32,
}

/// A new service under an existing class.
#[derive(Debug, Clone)]
pub struct NewService {
    pub service_class_id: ServiceClassId,
    pub name: String,
    pub short_description: String,
    pub detailed_description: String,
}

/// A new package under an existing service.
#[derive(Debug, Clone)]
pub struct NewPackage {
    pub service_id: ServiceId,
    pub package_type: String,
    pub duration_unit: DurationUnit,
    pub duration_value: String,
    pub price: PriceRange,
    pub button: ButtonBehavior,
    pub is_active: bool,
}

/// A new feature line of an existing package.
#[derive(Debug, Clone)]
pub struct NewPackageFeature {
    pub package_id: PackageId,
    pub text: String,
    pub display_order: i32,
}

/// A new payment method.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPaymentMethod {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub sort_order: i32,
}

const fn default_visible() -> bool {
    true
}
