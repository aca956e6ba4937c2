//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use servicecart_core::{Order, PaymentMethod};

use super::Layout;
use super::cart::CartView;
use crate::db::PaymentMethodStore;
use crate::error::Result;
use crate::filters;
use crate::services::{self, CheckoutError};
use crate::state::AppState;

/// Payment method display data for templates.
#[derive(Clone)]
pub struct PaymentMethodView {
    pub code: String,
    pub name: String,
    pub is_enabled: bool,
}

impl From<PaymentMethod> for PaymentMethodView {
    fn from(method: PaymentMethod) -> Self {
        Self {
            code: method.code,
            name: method.name,
            is_enabled: method.is_enabled,
        }
    }
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: i32,
    pub total_amount: Decimal,
    pub placed_at: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            total_amount: order.total_amount,
            placed_at: order.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

/// Payment form data.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub payment_method: String,
}

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub methods: Vec<PaymentMethodView>,
    pub selected: String,
    pub error: Option<String>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CompleteTemplate {
    pub layout: Layout,
    pub order: Option<OrderView>,
}

/// Render the payment page, or `None` when the cart is empty.
async fn payment_template(
    state: &AppState,
    session: &Session,
    selected: String,
    error: Option<String>,
) -> Result<Option<PaymentTemplate>> {
    let priced = services::cart::price_cart(state.store(), session).await?;
    if priced.is_empty() {
        return Ok(None);
    }

    let methods = state
        .store()
        .list_visible_payment_methods()
        .await?
        .into_iter()
        .map(PaymentMethodView::from)
        .collect();

    Ok(Some(PaymentTemplate {
        layout: Layout::load(state, session).await?,
        cart: CartView::from(&priced),
        methods,
        selected,
        error,
    }))
}

/// Display payment method selection.
#[instrument(skip(state, session))]
pub async fn payment_page(State(state): State<AppState>, session: Session) -> Result<Response> {
    Ok(
        match payment_template(&state, &session, String::new(), None).await? {
            Some(page) => page.into_response(),
            None => Redirect::to("/").into_response(),
        },
    )
}

/// Place the order with the selected payment method.
///
/// An unknown or disabled method re-renders the form with 422 and leaves
/// the cart as it was.
#[instrument(skip(state, session))]
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    match services::checkout::checkout(state.store(), &session, &form.payment_method).await {
        Ok(_) => Ok(Redirect::to("/checkout/complete/").into_response()),
        Err(CheckoutError::EmptyCart) => Ok(Redirect::to("/").into_response()),
        Err(err) if err.is_validation() => {
            info!(error = %err, "Payment method rejected");
            let message = "Please choose an available payment method.".to_string();
            Ok(
                match payment_template(&state, &session, form.payment_method, Some(message))
                    .await?
                {
                    Some(page) => (StatusCode::UNPROCESSABLE_ENTITY, page).into_response(),
                    None => Redirect::to("/").into_response(),
                },
            )
        }
        Err(err) => Err(err.into()),
    }
}

/// Display the order confirmation.
#[instrument(skip(state, session))]
pub async fn complete(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let order = services::checkout::last_order(state.store(), &session).await?;

    Ok(CompleteTemplate {
        layout: Layout::load(&state, &session).await?,
        order: order.as_ref().map(OrderView::from),
    })
}
