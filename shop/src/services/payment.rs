// src/services/payment.rs

//! Hosted checkout through an external payment provider.
//!
//! Provider failures never reach the visitor: the checkout flow logs them and
//! falls back to a simulated payment.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::{AppConfig, Secret};

/// Placeholder the provider substitutes with its own session id on redirect.
pub const CHECKOUT_SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

#[derive(Debug, Error)]
pub enum PaymentProviderError {
  #[error("payment provider unreachable: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("payment provider rejected the request ({status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("payment provider returned no redirect URL")]
  MissingRedirect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLineItem {
  pub name: String,
  /// Unit price in minor currency units.
  pub unit_amount: i64,
  pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedCheckoutRequest {
  pub order_id: i64,
  pub currency: String,
  pub line_items: Vec<CheckoutLineItem>,
  pub success_url: String,
  pub cancel_url: String,
}

impl HostedCheckoutRequest {
  /// Success and cancel URLs both point back at this application.
  pub fn for_order(order_id: i64, currency: &str, line_items: Vec<CheckoutLineItem>, app_base_url: &str) -> Self {
    Self {
      order_id,
      currency: currency.to_string(),
      line_items,
      success_url: format!(
        "{}/checkout/success?session_id={}",
        app_base_url, CHECKOUT_SESSION_ID_PLACEHOLDER
      ),
      cancel_url: format!("{}/cart", app_base_url),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostedCheckoutSession {
  pub id: String,
  pub url: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync + 'static {
  fn name(&self) -> &'static str;

  async fn create_checkout_session(
    &self,
    request: &HostedCheckoutRequest,
  ) -> Result<HostedCheckoutSession, PaymentProviderError>;
}

/// Stripe Checkout Sessions over its form-encoded REST API.
pub struct StripeCheckout {
  client: reqwest::Client,
  api_base: String,
  secret_key: Secret,
}

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
  id: String,
  url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
  error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
  message: Option<String>,
}

impl StripeCheckout {
  pub fn new(secret_key: Secret, api_base: &str, timeout: Duration) -> Result<Self, PaymentProviderError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      api_base: api_base.trim_end_matches('/').to_string(),
      secret_key,
    })
  }

  /// `None` when no secret key is configured.
  pub fn from_config(config: &AppConfig) -> Result<Option<Self>, PaymentProviderError> {
    match &config.stripe_secret_key {
      Some(key) => Self::new(key.clone(), &config.stripe_api_base, config.payment_timeout).map(Some),
      None => Ok(None),
    }
  }
}

#[async_trait]
impl PaymentProvider for StripeCheckout {
  fn name(&self) -> &'static str {
    "stripe"
  }

  #[instrument(name = "payment::stripe_create_session", skip_all, fields(order_id = request.order_id))]
  async fn create_checkout_session(
    &self,
    request: &HostedCheckoutRequest,
  ) -> Result<HostedCheckoutSession, PaymentProviderError> {
    let response = self
      .client
      .post(format!("{}/v1/checkout/sessions", self.api_base))
      .bearer_auth(self.secret_key.expose())
      .form(&encode_checkout_form(request))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      let message = serde_json::from_str::<StripeErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
      return Err(PaymentProviderError::Rejected {
        status: status.as_u16(),
        message,
      });
    }

    let session: StripeSessionResponse = response.json().await?;
    let url = session
      .url
      .filter(|u| !u.is_empty())
      .ok_or(PaymentProviderError::MissingRedirect)?;
    info!(provider_session_id = %session.id, "Hosted checkout session created.");
    Ok(HostedCheckoutSession { id: session.id, url })
  }
}

/// Flattens the request into Stripe's bracketed form keys.
pub fn encode_checkout_form(request: &HostedCheckoutRequest) -> Vec<(String, String)> {
  let mut form = vec![
    ("mode".to_string(), "payment".to_string()),
    ("success_url".to_string(), request.success_url.clone()),
    ("cancel_url".to_string(), request.cancel_url.clone()),
    ("client_reference_id".to_string(), request.order_id.to_string()),
    ("metadata[order_id]".to_string(), request.order_id.to_string()),
  ];
  for (idx, item) in request.line_items.iter().enumerate() {
    let prefix = format!("line_items[{}]", idx);
    form.push((format!("{}[price_data][currency]", prefix), request.currency.clone()));
    form.push((format!("{}[price_data][product_data][name]", prefix), item.name.clone()));
    form.push((format!("{}[price_data][unit_amount]", prefix), item.unit_amount.to_string()));
    form.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
  }
  form
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request() -> HostedCheckoutRequest {
    HostedCheckoutRequest::for_order(
      17,
      "inr",
      vec![
        CheckoutLineItem {
          name: "Yoga Mat Pro".to_string(),
          unit_amount: 2999,
          quantity: 2,
        },
        CheckoutLineItem {
          name: "LED Desk Lamp".to_string(),
          unit_amount: 2499,
          quantity: 1,
        },
      ],
      "https://shop.example",
    )
  }

  fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
    form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  #[test]
  fn urls_point_back_at_the_shop() {
    let req = request();
    assert_eq!(
      req.success_url,
      "https://shop.example/checkout/success?session_id={CHECKOUT_SESSION_ID}"
    );
    assert_eq!(req.cancel_url, "https://shop.example/cart");
  }

  #[test]
  fn form_carries_every_line_item() {
    let form = encode_checkout_form(&request());
    assert_eq!(value(&form, "mode"), Some("payment"));
    assert_eq!(value(&form, "metadata[order_id]"), Some("17"));
    assert_eq!(value(&form, "line_items[0][price_data][product_data][name]"), Some("Yoga Mat Pro"));
    assert_eq!(value(&form, "line_items[0][price_data][unit_amount]"), Some("2999"));
    assert_eq!(value(&form, "line_items[0][quantity]"), Some("2"));
    assert_eq!(value(&form, "line_items[1][price_data][currency]"), Some("inr"));
    assert_eq!(value(&form, "line_items[1][quantity]"), Some("1"));
    assert_eq!(value(&form, "line_items[2][quantity]"), None);
  }

  #[test]
  fn provider_is_absent_without_secret() {
    let config = AppConfig::from_lookup(|_| None).unwrap();
    assert!(StripeCheckout::from_config(&config).unwrap().is_none());

    let config = AppConfig::from_lookup(|key| (key == "STRIPE_SECRET_KEY").then(|| "sk_test_x".to_string())).unwrap();
    let provider = StripeCheckout::from_config(&config).unwrap().unwrap();
    assert_eq!(provider.name(), "stripe");
  }
}
