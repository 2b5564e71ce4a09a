// src/pipelines/cart_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::MAX_LINE_QUANTITY;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::services::catalog;
use stepflow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{info, instrument, warn};

pub fn build_add_to_cart_pipeline() -> Pipeline<AddToCartCtxData, AppError> {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("validate_cart_input", false, None),
    ("fetch_product_for_cart", false, None),
    ("add_or_update_cart_entry", false, None),
  ]);
  p.on_root("validate_cart_input", validate_cart_input);
  p.on_root("fetch_product_for_cart", fetch_product_for_cart);
  p.on_root("add_or_update_cart_entry", add_or_update_cart_entry);
  p
}

pub fn register_add_to_cart_pipeline(registry: &Registry<AppError>) {
  registry.register_pipeline(build_add_to_cart_pipeline());
  info!("Add to Cart pipeline registered.");
}

#[instrument(name = "cart_step::validate_input", skip(ctx_data), err)]
async fn validate_cart_input(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<PipelineControl> {
  let requested = ctx_data.read().requested_quantity;
  let quantity = u32::try_from(requested)
    .ok()
    .filter(|q| (1..=MAX_LINE_QUANTITY).contains(q))
    .ok_or_else(|| {
      warn!(requested, "Rejected cart quantity.");
      AppError::Validation(format!("Quantity must be between 1 and {}.", MAX_LINE_QUANTITY))
    })?;
  ctx_data.write().quantity = quantity;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "cart_step::fetch_product", skip(ctx_data), err)]
async fn fetch_product_for_cart(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<PipelineControl> {
  let (product_id, db_pool) = ctx_data.inspect(|c| (c.product_id, c.app_state.db_pool.clone()));
  let product = catalog::get_product(&db_pool, product_id).await?;
  ctx_data.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "cart_step::add_or_update_entry", skip(ctx_data), err)]
async fn add_or_update_cart_entry(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<PipelineControl> {
  let (sessions, session_id, product_id, quantity) = {
    let guard = ctx_data.read();
    (
      guard.app_state.sessions.clone(),
      guard.session_id,
      guard.product_id,
      guard.quantity,
    )
  };

  let mut state = sessions.get(&session_id).await?.unwrap_or_default();
  let line_quantity = state.cart.add(product_id, quantity)?;
  let cart_count = state.cart.total_quantity();
  sessions.set(&session_id, state).await?;

  info!(%session_id, product_id, line_quantity, cart_count, "Cart entry updated.");
  ctx_data.update(|c| {
    c.line_quantity = Some(line_quantity);
    c.cart_count = cart_count;
  });
  Ok(PipelineControl::Continue)
}
