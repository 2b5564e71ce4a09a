// src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use stepflow::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};

use super::{html_ok, see_other};
use crate::errors::AppError;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::services::cart_service;
use crate::state::AppState;
use crate::web::session::CartSession;
use crate::web::views;

fn default_quantity() -> i64 {
  1
}

#[derive(Deserialize, Debug)]
pub struct AddToCartForm {
  #[serde(alias = "productId")]
  pub product_id: i64,
  #[serde(default = "default_quantity")]
  pub qty: i64,
}

#[derive(Deserialize, Debug)]
pub struct RemoveFromCartForm {
  #[serde(alias = "productId")]
  pub product_id: i64,
  #[serde(default = "default_quantity")]
  pub qty: i64,
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, form, session),
  fields(session_id = %session.id, product_id = form.product_id, qty = form.qty)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  form: web::Form<AddToCartForm>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(AddToCartCtxData::new(
    app_state.get_ref().clone(),
    session.id,
    form.product_id,
    form.qty,
  ));

  match app_state.flows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let line_quantity = ctx.read().line_quantity;
      info!(?line_quantity, "Item added to cart.");
      session.attach(&app_state.config, see_other("/"))
    }
    PipelineResult::Stopped => {
      warn!("Add to Cart pipeline was stopped by a handler.");
      Err(AppError::Internal("Adding the item to the cart was halted.".to_string()))
    }
  }
}

#[instrument(name = "handler::view_cart", skip(app_state, session), fields(session_id = %session.id))]
pub async fn view_cart_handler(app_state: web::Data<AppState>, session: CartSession) -> Result<HttpResponse, AppError> {
  let cart = cart_service::view_cart(&app_state.db_pool, app_state.sessions.as_ref(), &session.id).await?;
  let page = views::cart_page(&cart, &app_state.config.payment_currency);
  session.attach(&app_state.config, html_ok(page))
}

#[instrument(
  name = "handler::remove_from_cart",
  skip(app_state, form, session),
  fields(session_id = %session.id, product_id = form.product_id, qty = form.qty)
)]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  form: web::Form<RemoveFromCartForm>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let quantity = u32::try_from(form.qty)
    .ok()
    .filter(|q| *q >= 1)
    .ok_or_else(|| AppError::Validation("Quantity to remove must be at least 1.".to_string()))?;
  cart_service::remove_item(app_state.sessions.as_ref(), &session.id, form.product_id, quantity).await?;
  session.attach(&app_state.config, see_other("/cart"))
}

#[instrument(name = "handler::clear_cart", skip(app_state, session), fields(session_id = %session.id))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>, session: CartSession) -> Result<HttpResponse, AppError> {
  cart_service::clear_cart(app_state.sessions.as_ref(), &session.id).await?;
  session.attach(&app_state.config, see_other("/cart"))
}
