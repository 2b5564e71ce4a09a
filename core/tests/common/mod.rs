// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use stepflow::{ContextData, FlowError, Handler, PipelineControl};
use tracing::Level;

/// Context used across the engine tests: records which steps ran and accumulates
/// a running total, the way the shop's flows accumulate line totals.
#[derive(Clone, Debug, Default)]
pub struct TallyContext {
  pub total: i64,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
  pub skip_discount: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Engine error: {0}")]
  Flow(String),

  #[error("Handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(err: FlowError) -> Self {
    TestError::Flow(format!("{:?}", err))
  }
}

/// Adds `amount` to the total and records `step_name`; stops if the context asks to.
pub fn add_amount_handler(step_name: &'static str, amount: i64) -> Handler<TallyContext, TestError> {
  Box::new(move |ctx: ContextData<TallyContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total += amount;
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, total = guard.total, "handler executed");
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing_handler(step_name: &'static str, message: &'static str) -> Handler<TallyContext, TestError> {
  Box::new(move |ctx: ContextData<TallyContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
