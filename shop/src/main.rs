// src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use simple_shop::config::AppConfig;
use simple_shop::errors::AppError;
use simple_shop::services::payment::{PaymentProvider, StripeCheckout};
use simple_shop::services::sessions::{InMemorySessionStore, SessionStore};
use simple_shop::state::AppState;
use simple_shop::web::handlers::not_found_handler;
use simple_shop::{db, pipelines, telemetry, web};
use std::sync::Arc;
use stepflow::Registry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  telemetry::init_tracing(app_config.log_format);
  tracing::info!(config = ?app_config, "Starting shop server...");

  let db_pool = db::connect(&app_config.database_url)
    .await
    .context("Failed to connect to the database")?;
  db::prepare_database(&db_pool, app_config.seed_db)
    .await
    .context("Failed to prepare the database")?;

  let payments: Option<Arc<dyn PaymentProvider>> = StripeCheckout::from_config(&app_config)
    .context("Failed to build the payment client")?
    .map(|provider| Arc::new(provider) as Arc<dyn PaymentProvider>);
  match &payments {
    Some(provider) => tracing::info!(provider = provider.name(), "Hosted checkout enabled."),
    None => tracing::warn!("No payment provider configured; checkouts will be simulated."),
  }

  let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(
    app_config.session_ttl,
    app_config.session_max_entries,
  ));

  let flows = Arc::new(Registry::<AppError>::new());
  pipelines::register_all_pipelines(&flows).context("Failed to register pipelines")?;

  let app_state = AppState {
    db_pool,
    flows,
    config: app_config.clone(),
    sessions,
    payments,
  };

  let server_address = app_config.bind_address();
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
      .default_service(actix_data::to(not_found_handler))
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
