// src/web/session.rs

//! The `shop_session` cookie and its request extractor.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use futures_util::future::{ready, Ready};
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::services::sessions::SessionId;

pub const SESSION_COOKIE_NAME: &str = "shop_session";

/// The visitor's session id, taken from the cookie or freshly issued.
#[derive(Debug, Clone, Copy)]
pub struct CartSession {
  pub id: SessionId,
  /// `true` when the request carried no usable cookie.
  pub is_new: bool,
}

impl FromRequest for CartSession {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let existing = req
      .cookie(SESSION_COOKIE_NAME)
      .and_then(|cookie| SessionId::parse(cookie.value()));
    let session = match existing {
      Some(id) => CartSession { id, is_new: false },
      None => {
        let id = SessionId::generate();
        debug!(session_id = %id, "Issuing new session id.");
        CartSession { id, is_new: true }
      }
    };
    ready(Ok(session))
  }
}

impl CartSession {
  pub fn cookie(&self, config: &AppConfig) -> Cookie<'static> {
    let max_age = i64::try_from(config.session_ttl.as_secs()).unwrap_or(i64::MAX);
    Cookie::build(SESSION_COOKIE_NAME, self.id.to_string())
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .secure(config.session_cookie_secure)
      .max_age(CookieDuration::seconds(max_age))
      .finish()
  }

  /// Attaches the session cookie, refreshing its max-age on every response.
  pub fn attach(&self, config: &AppConfig, mut response: HttpResponse) -> Result<HttpResponse> {
    response
      .add_cookie(&self.cookie(config))
      .map_err(|e| AppError::Internal(format!("Failed to set session cookie: {}", e)))?;
    Ok(response)
  }
}
