// src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use stepflow::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};

use super::{html_ok, see_other};
use crate::errors::AppError;
use crate::pipelines::contexts::{CheckoutCtxData, ProviderAttempt};
use crate::services::orders;
use crate::state::AppState;
use crate::web::session::CartSession;
use crate::web::views;

#[derive(Deserialize, Debug, Default)]
pub struct CheckoutSuccessQuery {
  pub session_id: Option<String>,
}

#[instrument(name = "handler::start_checkout", skip(app_state, session), fields(session_id = %session.id))]
pub async fn start_checkout_handler(
  app_state: web::Data<AppState>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(CheckoutCtxData::new(app_state.get_ref().clone(), session.id));

  match app_state.flows.run(ctx.clone()).await? {
    PipelineResult::Stopped => {
      info!("Nothing to check out, back to the cart.");
      session.attach(&app_state.config, see_other("/cart"))
    }
    PipelineResult::Completed => {
      let (attempt, summary) = {
        let guard = ctx.read();
        (guard.provider_attempt.clone(), guard.summary.clone())
      };
      match attempt {
        ProviderAttempt::Redirect { url, .. } => session.attach(&app_state.config, see_other(&url)),
        ProviderAttempt::NotConfigured | ProviderAttempt::Failed { .. } => {
          let summary = summary.ok_or_else(|| {
            warn!("Checkout completed without an order summary.");
            AppError::Internal("Checkout completed, but the order summary is unavailable.".to_string())
          })?;
          info!(order_id = summary.order_id, "Simulated checkout completed.");
          session.attach(&app_state.config, html_ok(views::checkout_success_page(&summary)))
        }
      }
    }
  }
}

/// Landing page after the hosted checkout, also reachable after a simulated one.
#[instrument(name = "handler::checkout_success", skip(app_state, session), fields(session_id = %session.id))]
pub async fn checkout_success_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CheckoutSuccessQuery>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let last_order = if session.is_new {
    None
  } else {
    app_state
      .sessions
      .get(&session.id)
      .await?
      .and_then(|state| state.last_order)
  };
  let Some(summary) = last_order else {
    return session.attach(&app_state.config, see_other("/"));
  };

  if let (Some(expected), Some(returned)) = (&summary.provider_session_id, &query.session_id) {
    if expected != returned {
      warn!(order_id = summary.order_id, "Provider session id does not match the last order.");
      return Err(AppError::Validation(
        "This payment confirmation does not belong to your order.".to_string(),
      ));
    }
  }

  if orders::mark_paid(&app_state.db_pool, summary.order_id).await? {
    info!(order_id = summary.order_id, "Order confirmed as paid.");
  }
  session.attach(&app_state.config, html_ok(views::checkout_success_page(&summary)))
}
