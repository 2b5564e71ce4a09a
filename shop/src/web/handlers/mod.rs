// src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod checkout_handlers;
pub mod product_handlers;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::web::views::HTML_CONTENT_TYPE;

pub(crate) fn html_ok(body: String) -> HttpResponse {
  HttpResponse::Ok().content_type(HTML_CONTENT_TYPE).body(body)
}

/// `303 See Other`, so a POST is followed by a GET.
pub(crate) fn see_other(location: &str) -> HttpResponse {
  HttpResponse::SeeOther()
    .insert_header((header::LOCATION, location))
    .finish()
}

/// Fallback for every unmatched route.
pub async fn not_found_handler(req: HttpRequest) -> Result<HttpResponse, AppError> {
  Err(AppError::NotFound(format!("No page at {}.", req.path())))
}
