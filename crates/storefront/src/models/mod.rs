//! Storefront models that are not shared with other crates.
//!
//! - [`catalog`] - Inputs for creating catalog entries and payment methods
//! - [`session`] - Keys for values kept in the visitor session

pub mod catalog;
pub mod session;

pub use catalog::{NewPackage, NewPackageFeature, NewPaymentMethod, NewService, NewServiceClass};
pub use session::keys as session_keys;
