// src/services/cart_service.rs

use crate::errors::Result;
use crate::models::{Cart, Product};
use crate::services::catalog;
use crate::services::sessions::{SessionId, SessionStore};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
  pub product: Product,
  pub quantity: u32,
  pub line_total: Decimal,
}

/// A cart joined with catalog data. Computed on every read, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartView {
  pub lines: Vec<CartLine>,
  pub subtotal: Decimal,
  pub item_count: u32,
}

impl CartView {
  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }
}

/// Joins `cart` with `products`, keeping cart order. Lines whose product is
/// missing from `products` are left out.
pub fn build_cart_view(cart: &Cart, products: &[Product]) -> CartView {
  let by_id: HashMap<i64, &Product> = products.iter().map(|p| (p.id, p)).collect();
  let mut view = CartView::default();
  for entry in cart.entries() {
    let Some(product) = by_id.get(&entry.product_id) else {
      continue;
    };
    let line_total = product.price() * Decimal::from(entry.quantity);
    view.subtotal += line_total;
    view.item_count += entry.quantity;
    view.lines.push(CartLine {
      product: (*product).clone(),
      quantity: entry.quantity,
      line_total,
    });
  }
  view
}

/// Loads the session's cart and prices it. Unknown sessions yield an empty view.
#[instrument(name = "cart::view", skip(pool, sessions), fields(session_id = %session_id))]
pub async fn view_cart(pool: &SqlitePool, sessions: &dyn SessionStore, session_id: &SessionId) -> Result<CartView> {
  let cart = sessions.get(session_id).await?.unwrap_or_default().cart;
  if cart.is_empty() {
    return Ok(CartView::default());
  }
  let products = catalog::products_by_ids(pool, &cart.product_ids()).await?;
  Ok(build_cart_view(&cart, &products))
}

/// Removes up to `quantity` units of `product_id`; absent products are a no-op.
#[instrument(name = "cart::remove_item", skip(sessions), fields(session_id = %session_id))]
pub async fn remove_item(
  sessions: &dyn SessionStore,
  session_id: &SessionId,
  product_id: i64,
  quantity: u32,
) -> Result<u32> {
  let Some(mut state) = sessions.get(session_id).await? else {
    return Ok(0);
  };
  if state.cart.quantity_of(product_id) == 0 {
    return Ok(0);
  }
  let remaining = state.cart.remove(product_id, quantity);
  sessions.set(session_id, state).await?;
  info!(product_id, remaining, "Cart line reduced.");
  Ok(remaining)
}

#[instrument(name = "cart::clear", skip(sessions), fields(session_id = %session_id))]
pub async fn clear_cart(sessions: &dyn SessionStore, session_id: &SessionId) -> Result<()> {
  let Some(mut state) = sessions.get(session_id).await? else {
    return Ok(());
  };
  if state.cart.is_empty() {
    return Ok(());
  }
  state.cart.clear();
  sessions.set(session_id, state).await?;
  info!("Cart cleared.");
  Ok(())
}
