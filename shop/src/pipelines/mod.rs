// src/pipelines/mod.rs

//! The shop's multi-step flows, expressed as `stepflow` pipelines.

use crate::errors::AppError;
use stepflow::{FlowResult, Registry};

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod contexts;

/// Registers every pipeline with `registry`. Called once at startup.
pub fn register_all_pipelines(registry: &Registry<AppError>) -> FlowResult<()> {
  tracing::info!("Registering pipelines...");
  cart_pipeline::register_add_to_cart_pipeline(registry);
  checkout_pipeline::register_checkout_pipeline(registry)?;
  tracing::info!("All application pipelines registered.");
  Ok(())
}
