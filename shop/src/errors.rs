// src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use stepflow::FlowError;
use thiserror::Error;

use crate::services::sessions::SessionError;
use crate::web::views;

/// Message shown for every 5xx; the details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error. Please try again later.";

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Database Migration Error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Session Store Error: {0}")]
  Session(#[from] SessionError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// The text the visitor sees. Server-side failures collapse to a generic message.
  pub fn public_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::NotFound(m) => m.clone(),
      _ => INTERNAL_ERROR_MESSAGE.to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }
    HttpResponse::build(status)
      .content_type(views::HTML_CONTENT_TYPE)
      .body(views::error_page(status.as_u16(), &self.public_message()))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
