//! Session-related types.
//!
//! The visitor session is the cart's keyed store: tower-sessions maps the
//! session cookie to a record holding the values below.

/// Session keys.
pub mod keys {
    /// Key for the cart mapping (package id → quantity).
    pub const CART: &str = "cart";

    /// Key for the id of the most recent order placed in this session.
    pub const LAST_ORDER_ID: &str = "last_order_id";
}
