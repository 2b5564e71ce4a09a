// src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};

use super::html_ok;
use crate::errors::AppError;
use crate::services::catalog::{self, CatalogFilter};
use crate::state::AppState;
use crate::web::session::CartSession;
use crate::web::views;

#[derive(Deserialize, Debug, Default)]
pub struct CatalogQuery {
  pub q: Option<String>,
  pub category: Option<String>,
  pub price: Option<String>,
}

async fn cart_count(app_state: &AppState, session: &CartSession) -> Result<u32, AppError> {
  if session.is_new {
    return Ok(0);
  }
  Ok(
    app_state
      .sessions
      .get(&session.id)
      .await?
      .map_or(0, |state| state.cart.total_quantity()),
  )
}

#[instrument(name = "handler::list_products", skip(app_state, session), fields(session_id = %session.id))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CatalogQuery>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let filter = CatalogFilter::from_params(query.q.as_deref(), query.category.as_deref(), query.price.as_deref());
  let products = catalog::list_products(&app_state.db_pool, &filter).await?;
  let categories = catalog::list_categories(&app_state.db_pool).await?;
  let count = cart_count(&app_state, &session).await?;
  info!(shown = products.len(), "Catalog rendered.");

  let page = views::catalog_page(
    &products,
    &categories,
    &filter,
    &app_state.config.payment_currency,
    count,
  );
  session.attach(&app_state.config, html_ok(page))
}

#[instrument(name = "handler::get_product", skip(app_state, path, session), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let product = catalog::get_product(&app_state.db_pool, path.into_inner()).await?;
  let count = cart_count(&app_state, &session).await?;
  let page = views::product_page(&product, &app_state.config.payment_currency, count);
  session.attach(&app_state.config, html_ok(page))
}
