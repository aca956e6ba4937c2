//! Checkout: payment method validation and order creation.
//!
//! Orders are charged the upper bound of the cart total. The cart is only
//! cleared once the order row exists, so a failed insert leaves the buyer's
//! cart intact.

mod error;

pub use error::CheckoutError;

use tower_sessions::Session;
use tracing::{info, instrument};

use servicecart_core::{Order, OrderId, PaymentMethod};

use super::cart;
use crate::db::{OrderStore, PaymentMethodStore, Store};
use crate::models::session_keys;

/// Resolve a submitted payment method code.
///
/// # Errors
///
/// Returns `CheckoutError::InvalidPaymentMethod` for an unknown code and
/// `CheckoutError::PaymentMethodDisabled` for a method that is not enabled.
pub async fn validate_selection<S>(store: &S, code: &str) -> Result<PaymentMethod, CheckoutError>
where
    S: PaymentMethodStore + ?Sized,
{
    let method = store
        .get_payment_method_by_code(code)
        .await?
        .ok_or_else(|| CheckoutError::InvalidPaymentMethod(code.to_string()))?;

    if !method.is_enabled {
        return Err(CheckoutError::PaymentMethodDisabled(method.name));
    }
    Ok(method)
}

/// Place an order for the session cart using the payment method `code`.
///
/// On success the order is recorded with the cart's maximum total, the
/// cart is cleared and the order id is remembered in the session for the
/// confirmation page.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` when there is nothing to buy, a
/// validation error for a bad payment method, or a store/session error.
#[instrument(skip(store, session))]
pub async fn checkout<S>(store: &S, session: &Session, code: &str) -> Result<Order, CheckoutError>
where
    S: Store + ?Sized,
{
    let priced = cart::price_cart(store, session).await?;
    if priced.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let method = validate_selection(store, code).await?;

    let session_key = session_key(session).await?;
    let order = store
        .create_order(&session_key, priced.charge_amount())
        .await?;

    cart::clear(session).await?;
    session.insert(session_keys::LAST_ORDER_ID, order.id).await?;

    info!(
        order_id = %order.id,
        payment_method = %method.code,
        total = %order.total_amount,
        "Checkout complete"
    );
    Ok(order)
}

/// The order placed most recently in this session, if any.
///
/// # Errors
///
/// Returns `CheckoutError` if the session or the store fails.
pub async fn last_order<S>(store: &S, session: &Session) -> Result<Option<Order>, CheckoutError>
where
    S: Store + ?Sized,
{
    let Some(id) = session.get::<OrderId>(session_keys::LAST_ORDER_ID).await? else {
        return Ok(None);
    };
    Ok(store.get_order(id).await?)
}

/// Identifier of the session, persisting it first if it has none yet.
async fn session_key(session: &Session) -> Result<String, CheckoutError> {
    if session.id().is_none() {
        session.save().await?;
    }
    Ok(session
        .id()
        .map(|id| id.to_string())
        .unwrap_or_default())
}
