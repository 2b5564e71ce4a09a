// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};

/// Stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Paid,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: i64,
  pub total_cents: i64,
  pub currency: String,
  pub status: OrderStatus,
  pub provider_session_id: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// One line of an [`OrderSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
  pub product_name: String,
  pub quantity: u32,
  pub line_total: Decimal,
}

/// What the success page shows; kept in the session after checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
  pub order_id: i64,
  pub lines: Vec<SummaryLine>,
  pub subtotal: Decimal,
  pub currency: String,
  pub provider_session_id: Option<String>,
  /// `true` when no hosted payment took place.
  pub simulated: bool,
}
