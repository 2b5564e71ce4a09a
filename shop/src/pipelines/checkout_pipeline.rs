// src/pipelines/checkout_pipeline.rs

//! Checkout: record the order, try the hosted payment page, otherwise settle a
//! simulated payment, then empty the cart.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{OrderSummary, SummaryLine};
use crate::pipelines::contexts::{CheckoutCtxData, ProviderAttempt};
use crate::services::cart_service::build_cart_view;
use crate::services::orders::{self, NewOrderLine};
use crate::services::payment::{CheckoutLineItem, HostedCheckoutRequest};
use crate::services::catalog;
use stepflow::{ContextData, FlowResult, Pipeline, PipelineControl, Registry};
use tracing::{info, instrument, warn};

pub fn build_checkout_pipeline() -> FlowResult<Pipeline<CheckoutCtxData, AppError>> {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("load_cart_for_checkout", false, None),
    ("record_checkout_order", false, None),
    ("request_hosted_checkout", false, None),
    ("settle_simulated_order", false, None),
    ("clear_cart_after_checkout", false, None),
  ]);

  p.set_skip_condition("request_hosted_checkout", |ctx: &CheckoutCtxData| {
    ctx.app_state.payments.is_none()
  })?;
  p.set_skip_condition("settle_simulated_order", |ctx: &CheckoutCtxData| {
    ctx.provider_attempt.is_redirect()
  })?;

  p.on_root("load_cart_for_checkout", load_cart_for_checkout);
  p.on_root("record_checkout_order", record_checkout_order);
  p.on_root("request_hosted_checkout", request_hosted_checkout);
  p.on_root("settle_simulated_order", settle_simulated_order);
  p.on_root("clear_cart_after_checkout", clear_cart_after_checkout);
  Ok(p)
}

pub fn register_checkout_pipeline(registry: &Registry<AppError>) -> FlowResult<()> {
  registry.register_pipeline(build_checkout_pipeline()?);
  info!("Checkout pipeline registered.");
  Ok(())
}

#[instrument(name = "checkout_step::load_cart", skip(ctx_data), err)]
async fn load_cart_for_checkout(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (sessions, session_id, db_pool) = {
    let guard = ctx_data.read();
    (
      guard.app_state.sessions.clone(),
      guard.session_id,
      guard.app_state.db_pool.clone(),
    )
  };

  let session = sessions.get(&session_id).await?.unwrap_or_default();
  let products = catalog::products_by_ids(&db_pool, &session.cart.product_ids()).await?;
  let cart = build_cart_view(&session.cart, &products);
  if cart.is_empty() {
    info!(%session_id, "Checkout requested with an empty cart.");
    return Ok(PipelineControl::Stop);
  }

  info!(%session_id, subtotal = %cart.subtotal, items = cart.item_count, "Cart loaded for checkout.");
  let mut guard = ctx_data.write();
  guard.session = session;
  guard.cart = cart;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout_step::record_order", skip(ctx_data), err)]
async fn record_checkout_order(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (db_pool, currency, lines) = {
    let guard = ctx_data.read();
    let lines: Vec<NewOrderLine> = guard
      .cart
      .lines
      .iter()
      .map(|line| NewOrderLine {
        product_id: line.product.id,
        quantity: line.quantity,
        unit_price_cents: line.product.price_cents,
      })
      .collect();
    (
      guard.app_state.db_pool.clone(),
      guard.app_state.config.payment_currency.clone(),
      lines,
    )
  };

  let order = orders::create_order(&db_pool, &currency, &lines).await?;
  ctx_data.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

/// Provider failures are logged and recorded, never returned: the next step
/// then settles the order locally.
#[instrument(name = "checkout_step::request_hosted", skip(ctx_data), err)]
async fn request_hosted_checkout(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (provider, db_pool, request) = {
    let guard = ctx_data.read();
    let Some(provider) = guard.app_state.payments.clone() else {
      return Ok(PipelineControl::Continue);
    };
    let order_id = current_order_id(&guard)?;
    let line_items = guard
      .cart
      .lines
      .iter()
      .map(|line| CheckoutLineItem {
        name: line.product.name.clone(),
        unit_amount: line.product.price_cents,
        quantity: line.quantity,
      })
      .collect();
    let config = &guard.app_state.config;
    let request = HostedCheckoutRequest::for_order(
      order_id,
      &config.payment_currency,
      line_items,
      &config.app_base_url,
    );
    (provider, guard.app_state.db_pool.clone(), request)
  };

  let attempt = match provider.create_checkout_session(&request).await {
    Ok(session) => {
      orders::set_provider_session(&db_pool, request.order_id, &session.id).await?;
      info!(
        order_id = request.order_id,
        provider = provider.name(),
        provider_session_id = %session.id,
        "Redirecting to hosted checkout."
      );
      ProviderAttempt::Redirect {
        provider_session_id: session.id,
        url: session.url,
      }
    }
    Err(e) => {
      warn!(
        order_id = request.order_id,
        provider = provider.name(),
        error = %e,
        "Hosted checkout unavailable, falling back to simulated payment."
      );
      ProviderAttempt::Failed { reason: e.to_string() }
    }
  };
  ctx_data.write().provider_attempt = attempt;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout_step::settle_simulated", skip(ctx_data), err)]
async fn settle_simulated_order(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (db_pool, order_id) = {
    let guard = ctx_data.read();
    (guard.app_state.db_pool.clone(), current_order_id(&guard)?)
  };
  orders::mark_paid(&db_pool, order_id).await?;
  info!(order_id, "Simulated payment settled.");
  Ok(PipelineControl::Continue)
}

/// Saves the summary and the emptied cart in a single session write.
#[instrument(name = "checkout_step::clear_cart", skip(ctx_data), err)]
async fn clear_cart_after_checkout(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (sessions, session_id, mut session, summary) = {
    let guard = ctx_data.read();
    let order_id = current_order_id(&guard)?;
    let provider_session_id = match &guard.provider_attempt {
      ProviderAttempt::Redirect { provider_session_id, .. } => Some(provider_session_id.clone()),
      _ => None,
    };
    let summary = OrderSummary {
      order_id,
      lines: guard
        .cart
        .lines
        .iter()
        .map(|line| SummaryLine {
          product_name: line.product.name.clone(),
          quantity: line.quantity,
          line_total: line.line_total,
        })
        .collect(),
      subtotal: guard.cart.subtotal,
      currency: guard.app_state.config.payment_currency.clone(),
      simulated: provider_session_id.is_none(),
      provider_session_id,
    };
    (
      guard.app_state.sessions.clone(),
      guard.session_id,
      guard.session.clone(),
      summary,
    )
  };

  session.cart.clear();
  session.last_order = Some(summary.clone());
  sessions.set(&session_id, session).await?;

  info!(%session_id, order_id = summary.order_id, "Cart cleared after checkout.");
  let mut guard = ctx_data.write();
  guard.summary = Some(summary);
  guard.cart_cleared = true;
  Ok(PipelineControl::Continue)
}

fn current_order_id(ctx: &CheckoutCtxData) -> AppResult<i64> {
  ctx
    .order
    .as_ref()
    .map(|o| o.id)
    .ok_or_else(|| AppError::Internal("Checkout reached a payment step without a recorded order.".to_string()))
}
