//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Session cart: add, remove, price and prune
//! - `checkout` - Payment method validation and order creation
//!
//! Services are generic over the store traits and take the visitor's
//! [`tower_sessions::Session`] explicitly, so they run the same against
//! `PostgreSQL` and the in-memory store.

pub mod cart;
pub mod checkout;

pub use cart::CartError;
pub use checkout::CheckoutError;
