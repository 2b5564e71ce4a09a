// src/services/orders.rs

//! The checkout record: one order row per checkout plus its items.

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatus};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
  pub product_id: i64,
  pub quantity: u32,
  pub unit_price_cents: i64,
}

impl NewOrderLine {
  pub fn line_total_cents(&self) -> i64 {
    self.unit_price_cents * i64::from(self.quantity)
  }
}

/// Writes a `pending` order and all of its items in one transaction.
#[instrument(name = "orders::create", skip(pool, lines), fields(line_count = lines.len()))]
pub async fn create_order(pool: &SqlitePool, currency: &str, lines: &[NewOrderLine]) -> Result<Order> {
  if lines.is_empty() {
    return Err(AppError::Validation("Cannot record an order without items.".to_string()));
  }
  let total_cents: i64 = lines.iter().map(NewOrderLine::line_total_cents).sum();

  let mut tx = pool.begin().await?;
  let order = sqlx::query_as::<_, Order>(
    "INSERT INTO orders (total_cents, currency, status, created_at) VALUES (?, ?, ?, ?) \
     RETURNING id, total_cents, currency, status, provider_session_id, created_at",
  )
  .bind(total_cents)
  .bind(currency)
  .bind(OrderStatus::Pending)
  .bind(Utc::now())
  .fetch_one(&mut *tx)
  .await?;

  for line in lines {
    sqlx::query(
      "INSERT INTO order_items (order_id, product_id, quantity, unit_price_cents, line_total_cents) \
       VALUES (?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(line.product_id)
    .bind(i64::from(line.quantity))
    .bind(line.unit_price_cents)
    .bind(line.line_total_cents())
    .execute(&mut *tx)
    .await?;
  }
  tx.commit().await?;

  info!(order_id = order.id, total_cents, "Order recorded.");
  Ok(order)
}

pub async fn set_provider_session(pool: &SqlitePool, order_id: i64, provider_session_id: &str) -> Result<()> {
  sqlx::query("UPDATE orders SET provider_session_id = ? WHERE id = ?")
    .bind(provider_session_id)
    .bind(order_id)
    .execute(pool)
    .await?;
  Ok(())
}

/// Marks the order paid. Returns `false` when it already was.
#[instrument(name = "orders::mark_paid", skip(pool))]
pub async fn mark_paid(pool: &SqlitePool, order_id: i64) -> Result<bool> {
  let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ? AND status <> ?")
    .bind(OrderStatus::Paid)
    .bind(order_id)
    .bind(OrderStatus::Paid)
    .execute(pool)
    .await?;
  let changed = result.rows_affected() == 1;
  if changed {
    info!("Order marked paid.");
  } else if find_order(pool, order_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Order {} not found.", order_id)));
  }
  Ok(changed)
}

pub async fn find_order(pool: &SqlitePool, order_id: i64) -> Result<Option<Order>> {
  let order = sqlx::query_as::<_, Order>(
    "SELECT id, total_cents, currency, status, provider_session_id, created_at FROM orders WHERE id = ?",
  )
  .bind(order_id)
  .fetch_optional(pool)
  .await?;
  Ok(order)
}
