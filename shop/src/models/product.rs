// src/models/product.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  /// Price in minor currency units.
  pub price_cents: i64,
  pub image_url: Option<String>,
  pub category: Option<String>,
}

impl Product {
  pub fn price(&self) -> Decimal {
    Decimal::new(self.price_cents, 2)
  }
}
