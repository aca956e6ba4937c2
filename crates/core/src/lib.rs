//! ServiceCart Core - Shared domain types.
//!
//! This crate provides the types used across all ServiceCart components:
//! - `storefront` - Public catalog, cart and checkout site
//! - `cli` - Command-line tools for migrations, seeding and order listing
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Pricing a cart takes the packages it references as an
//! argument, so callers decide where they come from.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, slugs, price ranges and catalog/order entities
//! - [`cart`] - Session cart mapping and line-item pricing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, LineItem, PricedCart};
pub use types::*;
