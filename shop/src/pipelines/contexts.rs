// src/pipelines/contexts.rs

//! Data carried through each pipeline. Handlers receive these wrapped in
//! `stepflow::ContextData`.

use crate::models::{Order, OrderSummary, Product};
use crate::services::cart_service::CartView;
use crate::services::sessions::{SessionId, SessionState};
use crate::state::AppState;

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub session_id: SessionId,
  pub product_id: i64,
  /// As submitted; checked by `validate_cart_input`.
  pub requested_quantity: i64,
  pub quantity: u32,
  pub product: Option<Product>,
  /// Quantity of the product's line after the add.
  pub line_quantity: Option<u32>,
  /// Units in the whole cart after the add.
  pub cart_count: u32,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, session_id: SessionId, product_id: i64, requested_quantity: i64) -> Self {
    Self {
      app_state,
      session_id,
      product_id,
      requested_quantity,
      quantity: 0,
      product: None,
      line_quantity: None,
      cart_count: 0,
    }
  }
}

/// How the hosted payment request went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderAttempt {
  /// No provider credential, so no request was made.
  NotConfigured,
  /// The visitor should continue at `url`.
  Redirect { provider_session_id: String, url: String },
  /// The provider could not be used; the checkout falls back to a simulated payment.
  Failed { reason: String },
}

impl ProviderAttempt {
  pub fn is_redirect(&self) -> bool {
    matches!(self, ProviderAttempt::Redirect { .. })
  }
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub session_id: SessionId,
  /// Session as loaded at the start of the checkout.
  pub session: SessionState,
  pub cart: CartView,
  pub order: Option<Order>,
  pub provider_attempt: ProviderAttempt,
  pub summary: Option<OrderSummary>,
  pub cart_cleared: bool,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, session_id: SessionId) -> Self {
    Self {
      app_state,
      session_id,
      session: SessionState::default(),
      cart: CartView::default(),
      order: None,
      provider_attempt: ProviderAttempt::NotConfigured,
      summary: None,
      cart_cleared: false,
    }
  }
}
