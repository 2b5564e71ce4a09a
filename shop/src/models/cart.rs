// src/models/cart.rs

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound for the quantity of a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
  pub product_id: i64,
  pub quantity: u32,
}

/// Lines in insertion order, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
  entries: Vec<CartEntry>,
}

impl Cart {
  /// Adds `quantity` units of `product_id` and returns the line's new quantity.
  pub fn add(&mut self, product_id: i64, quantity: u32) -> Result<u32> {
    if quantity == 0 || quantity > MAX_LINE_QUANTITY {
      return Err(AppError::Validation(format!(
        "Quantity must be between 1 and {}.",
        MAX_LINE_QUANTITY
      )));
    }
    match self.entries.iter_mut().find(|e| e.product_id == product_id) {
      Some(entry) => {
        let updated = entry.quantity + quantity;
        if updated > MAX_LINE_QUANTITY {
          return Err(AppError::Validation(format!(
            "A cart line cannot hold more than {} units.",
            MAX_LINE_QUANTITY
          )));
        }
        entry.quantity = updated;
        Ok(updated)
      }
      None => {
        self.entries.push(CartEntry { product_id, quantity });
        Ok(quantity)
      }
    }
  }

  /// Takes up to `quantity` units away; the line disappears when it reaches zero.
  /// Returns the remaining quantity, `0` also for products that were not in the cart.
  pub fn remove(&mut self, product_id: i64, quantity: u32) -> u32 {
    let Some(idx) = self.entries.iter().position(|e| e.product_id == product_id) else {
      return 0;
    };
    let remaining = self.entries[idx].quantity.saturating_sub(quantity);
    if remaining == 0 {
      self.entries.remove(idx);
    } else {
      self.entries[idx].quantity = remaining;
    }
    remaining
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn entries(&self) -> &[CartEntry] {
    &self.entries
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Units across all lines, shown as the cart badge.
  pub fn total_quantity(&self) -> u32 {
    self.entries.iter().map(|e| e.quantity).sum()
  }

  pub fn quantity_of(&self, product_id: i64) -> u32 {
    self
      .entries
      .iter()
      .find(|e| e.product_id == product_id)
      .map_or(0, |e| e.quantity)
  }

  pub fn product_ids(&self) -> Vec<i64> {
    self.entries.iter().map(|e| e.product_id).collect()
  }
}
