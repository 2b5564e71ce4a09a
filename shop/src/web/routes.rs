// src/web/routes.rs

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{cart_handlers, checkout_handlers, product_handlers};

/// Liveness plus a database round trip.
async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&app_state.db_pool).await {
    Ok(_) => HttpResponse::Ok().json(json!({ "status": "ok", "database": "ok" })),
    Err(e) => {
      tracing::error!(error = %e, "Health check could not reach the database.");
      HttpResponse::ServiceUnavailable().json(json!({ "status": "degraded", "database": "unavailable" }))
    }
  }
}

/// Registers every route plus the extractor error mapping. The 404 fallback is
/// installed by the caller through `default_service`.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::FormConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid form submission: {}", err)).into()),
    )
    .app_data(
      web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid query string: {}", err)).into()),
    )
    .app_data(
      web::PathConfig::default().error_handler(|_err, req| {
        AppError::NotFound(format!("No page at {}.", req.path())).into()
      }),
    )
    .route("/", web::get().to(product_handlers::list_products_handler))
    .route("/health", web::get().to(health_check_handler))
    .route(
      "/products/{product_id}",
      web::get().to(product_handlers::get_product_handler),
    )
    .service(
      web::scope("/cart")
        .route("", web::get().to(cart_handlers::view_cart_handler))
        .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
        .route("/remove", web::post().to(cart_handlers::remove_from_cart_handler))
        .route("/clear", web::post().to(cart_handlers::clear_cart_handler)),
    )
    .service(
      web::scope("/checkout")
        .route("", web::post().to(checkout_handlers::start_checkout_handler))
        .route("/success", web::get().to(checkout_handlers::checkout_success_handler)),
    );
}
