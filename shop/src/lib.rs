// src/lib.rs

//! A small web shop: browse a catalog, keep a per-session cart and check out
//! through a hosted payment page, or a simulated payment when none is available.
//!
//! The add-to-cart and checkout flows run as `stepflow` pipelines registered
//! once at startup and shared through [`state::AppState`].

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod web;

pub use errors::{AppError, Result};
pub use state::AppState;
