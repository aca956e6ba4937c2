//! Checkout error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::cart::CartError;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// No payment method has the submitted code.
    #[error("unknown payment method: {0}")]
    InvalidPaymentMethod(String),

    /// The payment method exists but is switched off.
    #[error("payment method is disabled: {0}")]
    PaymentMethodDisabled(String),

    /// Cart could not be read or priced.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session store error.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl CheckoutError {
    /// Whether the buyer can fix this by choosing another payment method.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPaymentMethod(_) | Self::PaymentMethodDisabled(_)
        )
    }
}
