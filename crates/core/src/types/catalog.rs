//! Catalog entities: service classes, services, packages and features.
//!
//! The catalog is a strict four-level tree:
//!
//! ```text
//! ServiceClass ─┬─ Service ─┬─ Package ─┬─ PackageFeature
//!               │           │           └─ PackageFeature
//!               │           └─ Package
//!               └─ Service
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::{PackageFeatureId, PackageId, ServiceClassId, ServiceId};
use super::price::PriceRange;
use super::slug::Slug;

/// Error returned when a stored enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// Billing frequency of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    OneTime,
    Month,
    Quarter,
    HalfYear,
    Year,
    Project,
}

impl DurationUnit {
    /// Database/storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneTime => "one_time",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::HalfYear => "half_year",
            Self::Year => "year",
            Self::Project => "project",
        }
    }

    /// Label shown to visitors.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OneTime => "One-Time",
            Self::Month => "Month(s)",
            Self::Quarter => "Quarterly",
            Self::HalfYear => "Half-Yearly",
            Self::Year => "Yearly",
            Self::Project => "Project",
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationUnit {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_time" => Ok(Self::OneTime),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "half_year" => Ok(Self::HalfYear),
            "year" => Ok(Self::Year),
            "project" => Ok(Self::Project),
            _ => Err(ParseEnumError {
                kind: "duration unit",
                value: s.to_owned(),
            }),
        }
    }
}

/// What the call-to-action of a package does on the service page.
///
/// Only [`ButtonBehavior::AddToCart`] packages may ever enter a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonBehavior {
    /// Show the price only; no purchase action.
    ShowPrice,
    /// Offer an "Add to Cart" button.
    #[default]
    AddToCart,
    /// Route the visitor to a sales contact instead of the cart.
    ContactSales,
}

impl ButtonBehavior {
    /// Database/storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ShowPrice => "show_price",
            Self::AddToCart => "add_to_cart",
            Self::ContactSales => "contact_sales",
        }
    }

    /// Whether packages with this behavior can be added to a cart.
    #[must_use]
    pub const fn allows_cart(&self) -> bool {
        matches!(self, Self::AddToCart)
    }
}

impl fmt::Display for ButtonBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonBehavior {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "show_price" => Ok(Self::ShowPrice),
            "add_to_cart" => Ok(Self::AddToCart),
            "contact_sales" => Ok(Self::ContactSales),
            _ => Err(ParseEnumError {
                kind: "button behavior",
                value: s.to_owned(),
            }),
        }
    }
}

/// Top-level catalog category (e.g. "AI Services").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClass {
    pub id: ServiceClassId,
    pub name: String,
    pub slug: Slug,
    /// Short summary for the index page.
    pub description: String,
    /// Position on the index page (ascending).
    pub display_order: i32,
}

/// A sellable offering inside a [`ServiceClass`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub service_class_id: ServiceClassId,
    pub name: String,
    pub slug: Slug,
    /// Teaser for the class page.
    pub short_description: String,
    /// Full details for the service page.
    pub detailed_description: String,
}

/// A priced, duration-bound variant of a [`Service`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub service_id: ServiceId,
    /// Name of the owning service, carried for cart and order display.
    pub service_name: String,
    /// Tier label, e.g. "Bronze" or "Enterprise".
    pub package_type: String,
    pub duration_unit: DurationUnit,
    /// Free-form duration, e.g. "12 Months".
    pub duration_value: String,
    pub price: PriceRange,
    pub button: ButtonBehavior,
    pub is_active: bool,
}

impl Package {
    /// Whether this package may be added to a cart right now.
    #[must_use]
    pub const fn can_add_to_cart(&self) -> bool {
        self.is_active && self.button.allows_cart()
    }

    /// Price as shown on the site.
    #[must_use]
    pub fn display_price(&self) -> String {
        self.price.display()
    }

    /// "Tier - Service" label.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} - {}", self.package_type, self.service_name)
    }
}

/// One bullet point of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFeature {
    pub id: PackageFeatureId,
    pub package_id: PackageId,
    pub text: String,
    pub display_order: i32,
}

/// An active package with its ordered features, as listed on a service page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedPackage {
    pub package: Package,
    pub features: Vec<PackageFeature>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn package(button: ButtonBehavior, is_active: bool) -> Package {
        Package {
            id: PackageId::new(1),
            service_id: ServiceId::new(1),
            service_name: "AI Strategy".to_string(),
            package_type: "Bronze".to_string(),
            duration_unit: DurationUnit::Project,
            duration_value: "Project".to_string(),
            price: PriceRange::new(Decimal::new(100, 0), Decimal::new(150, 0)),
            button,
            is_active,
        }
    }

    #[test]
    fn test_duration_unit_roundtrip() {
        for unit in [
            DurationUnit::OneTime,
            DurationUnit::Month,
            DurationUnit::Quarter,
            DurationUnit::HalfYear,
            DurationUnit::Year,
            DurationUnit::Project,
        ] {
            assert_eq!(unit.as_str().parse::<DurationUnit>().unwrap(), unit);
        }
    }

    #[test]
    fn test_duration_unit_rejects_unknown() {
        let err = "fortnight".parse::<DurationUnit>().unwrap_err();
        assert_eq!(err.to_string(), "invalid duration unit: fortnight");
    }

    #[test]
    fn test_button_behavior_serde_matches_storage() {
        let json = serde_json::to_string(&ButtonBehavior::ContactSales).unwrap();
        assert_eq!(json, "\"contact_sales\"");
        assert_eq!(
            "contact_sales".parse::<ButtonBehavior>().unwrap(),
            ButtonBehavior::ContactSales
        );
    }

    #[test]
    fn test_button_behavior_default_is_add_to_cart() {
        assert_eq!(ButtonBehavior::default(), ButtonBehavior::AddToCart);
    }

    #[test]
    fn test_can_add_to_cart_requires_active_cart_button() {
        assert!(package(ButtonBehavior::AddToCart, true).can_add_to_cart());
        assert!(!package(ButtonBehavior::AddToCart, false).can_add_to_cart());
        assert!(!package(ButtonBehavior::ShowPrice, true).can_add_to_cart());
        assert!(!package(ButtonBehavior::ContactSales, true).can_add_to_cart());
    }

    #[test]
    fn test_package_title() {
        assert_eq!(
            package(ButtonBehavior::AddToCart, true).title(),
            "Bronze - AI Strategy"
        );
    }
}
