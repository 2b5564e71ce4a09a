// tests/registry_tests.rs
mod common;

use common::*;
use serial_test::serial;
use stepflow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult, Registry};

#[derive(Clone, Debug, Default)]
struct LabelContext {
  label: String,
}

fn tally_pipeline() -> Pipeline<TallyContext, TestError> {
  let mut pipeline = Pipeline::new(&[("count", false, None)]);
  pipeline.on_root("count", add_amount_handler("count", 7));
  pipeline
}

fn label_pipeline() -> Pipeline<LabelContext, TestError> {
  let mut pipeline = Pipeline::new(&[("label", false, None)]);
  pipeline.on_root("label", |ctx: ContextData<LabelContext>| {
    Box::pin(async move {
      ctx.write().label = "labelled".to_string();
      Ok::<_, TestError>(PipelineControl::Continue)
    })
  });
  pipeline
}

#[tokio::test]
#[serial]
async fn test_registry_dispatches_by_context_type() {
  setup_tracing();
  let registry: Registry<TestError> = Registry::new();
  registry.register_pipeline(tally_pipeline());
  registry.register_pipeline(label_pipeline());

  assert!(registry.is_registered::<TallyContext>());
  assert!(registry.is_registered::<LabelContext>());

  let tally = ContextData::new(TallyContext::default());
  let label = ContextData::new(LabelContext::default());

  assert_eq!(registry.run(tally.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(registry.run(label.clone()).await, Ok(PipelineResult::Completed));

  assert_eq!(tally.read().total, 7);
  assert_eq!(label.read().label, "labelled");
}

#[tokio::test]
#[serial]
async fn test_registry_reports_unregistered_context() {
  setup_tracing();
  let registry: Registry<TestError> = Registry::new();
  registry.register_pipeline(tally_pipeline());

  assert!(!registry.is_registered::<LabelContext>());
  match registry.run(ContextData::new(LabelContext::default())).await {
    Err(TestError::Flow(msg)) => assert!(msg.contains("NotRegistered")),
    other => panic!("expected NotRegistered, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_registering_again_replaces_previous_pipeline() {
  setup_tracing();
  let registry: Registry<TestError> = Registry::new();
  registry.register_pipeline(tally_pipeline());

  let mut replacement = Pipeline::<TallyContext, TestError>::new(&[("count", false, None)]);
  replacement.on_root("count", add_amount_handler("count", 1));
  registry.register_pipeline(replacement);

  let ctx = ContextData::new(TallyContext::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().total, 1);
}

#[tokio::test]
#[serial]
async fn test_registry_with_default_error_type() {
  setup_tracing();
  let registry: Registry = Registry::default();
  let mut pipeline = Pipeline::<LabelContext, FlowError>::new(&[("missing", false, None)]);
  pipeline.set_optional("missing", false).unwrap();
  registry.register_pipeline(pipeline);

  let result = registry.run(ContextData::new(LabelContext::default())).await;
  assert!(matches!(
    result,
    Err(FlowError::HandlerMissing { ref step_name }) if step_name == "missing"
  ));
}

#[tokio::test]
#[serial]
async fn test_handler_errors_surface_through_registry() {
  setup_tracing();
  let registry: Registry<TestError> = Registry::new();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[("fail", false, None)]);
  pipeline.on_root("fail", failing_handler("fail", "boom"));
  registry.register_pipeline(pipeline);

  let result = registry.run(ContextData::new(TallyContext::default())).await;
  assert_eq!(result, Err(TestError::Handler("boom".to_string())));
}
