//! Core types for ServiceCart.
//!
//! This module provides type-safe wrappers for the catalog, payment and
//! order domain.

pub mod catalog;
pub mod id;
pub mod order;
pub mod payment;
pub mod price;
pub mod slug;

pub use catalog::{
    ButtonBehavior, DurationUnit, ListedPackage, Package, PackageFeature, ParseEnumError,
    Service, ServiceClass,
};
pub use id::*;
pub use order::Order;
pub use payment::PaymentMethod;
pub use price::{PriceRange, format_usd};
pub use slug::{Slug, SlugError, slugify};
