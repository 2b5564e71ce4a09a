// src/models/mod.rs

//! Catalog rows, the checkout record and the session cart.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartEntry, MAX_LINE_QUANTITY};
pub use order::{Order, OrderStatus, OrderSummary, SummaryLine};
pub use product::Product;
