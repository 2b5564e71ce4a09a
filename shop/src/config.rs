// src/config.rs

use crate::errors::{AppError, Result};
use crate::services::sessions::DEFAULT_MAX_SESSIONS;
use dotenvy::dotenv;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A credential that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for Secret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Secret([REDACTED])")
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pretty" | "" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected 'pretty' or 'json'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub app_base_url: String,

  /// `None` disables the hosted checkout; every checkout is then simulated.
  pub stripe_secret_key: Option<Secret>,
  pub stripe_api_base: String,
  pub payment_currency: String,
  pub payment_timeout: Duration,

  pub session_ttl: Duration,
  pub session_max_entries: usize,
  pub session_cookie_secure: bool,

  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  /// Loads `.env` if present, then reads the process environment.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = match get("SERVER_PORT").or_else(|| get("PORT")) {
      Some(raw) => parse_value::<u16>("SERVER_PORT", &raw)?,
      None => 8000,
    };
    let database_url = get("DATABASE_URL").unwrap_or_else(|| "sqlite://app.db?mode=rwc".to_string());
    let app_base_url = get("APP_BASE_URL")
      .unwrap_or_else(|| format!("http://{}:{}", server_host, server_port))
      .trim_end_matches('/')
      .to_string();

    let stripe_secret_key = get("STRIPE_SECRET_KEY").map(Secret::new);
    let stripe_api_base = get("STRIPE_API_BASE")
      .unwrap_or_else(|| "https://api.stripe.com".to_string())
      .trim_end_matches('/')
      .to_string();
    let payment_currency = get("PAYMENT_CURRENCY")
      .unwrap_or_else(|| "inr".to_string())
      .to_ascii_lowercase();
    let payment_timeout = Duration::from_secs(match get("PAYMENT_TIMEOUT_SECS") {
      Some(raw) => parse_value::<u64>("PAYMENT_TIMEOUT_SECS", &raw)?,
      None => 10,
    });

    let session_ttl_secs = match get("SESSION_TTL_SECS") {
      Some(raw) => parse_value::<u64>("SESSION_TTL_SECS", &raw)?,
      None => 604_800,
    };
    if session_ttl_secs == 0 {
      return Err(AppError::Config("SESSION_TTL_SECS must be greater than zero".to_string()));
    }
    let session_max_entries = match get("SESSION_MAX_ENTRIES") {
      Some(raw) => parse_value::<usize>("SESSION_MAX_ENTRIES", &raw)?,
      None => DEFAULT_MAX_SESSIONS,
    };
    if session_max_entries == 0 {
      return Err(AppError::Config("SESSION_MAX_ENTRIES must be greater than zero".to_string()));
    }
    let session_cookie_secure = match get("SESSION_COOKIE_SECURE") {
      Some(raw) => parse_value::<bool>("SESSION_COOKIE_SECURE", &raw)?,
      None => false,
    };

    let seed_db = match get("SEED_DB") {
      Some(raw) => parse_value::<bool>("SEED_DB", &raw)?,
      None => true,
    };
    let log_format = match get("LOG_FORMAT") {
      Some(raw) => raw.parse::<LogFormat>()?,
      None => LogFormat::Pretty,
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      stripe_secret_key,
      stripe_api_base,
      payment_currency,
      payment_timeout,
      session_ttl: Duration::from_secs(session_ttl_secs),
      session_max_entries,
      session_cookie_secure,
      seed_db,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  raw
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", key, raw, e)))
}
