// src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::payment::PaymentProvider;
use crate::services::sessions::SessionStore;
use sqlx::SqlitePool;
use std::sync::Arc;
use stepflow::Registry;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: SqlitePool,
  pub flows: Arc<Registry<AppError>>,
  pub config: Arc<AppConfig>,
  pub sessions: Arc<dyn SessionStore>,
  /// `None` when hosted checkout is not configured.
  pub payments: Option<Arc<dyn PaymentProvider>>,
}
