// storelink/core/tests/error_handling_tests.rs
mod common;
use common::*;
use serial_test::serial;
use storelink_flow::{ContextData, FlowError, Pipeline, PipelineControl};

#[tokio::test]
#[serial]
async fn test_pipeline_run_catches_handler_missing() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new("missing", &[("missing", false, None)]);
  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  match result.err().unwrap() {
    TestError::Flow(s) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("missing"));
    }
    other => panic!("Expected TestError::Flow(HandlerMissing), got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_pipeline_with_flow_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, FlowError>::new("flow", &[("task", false, None)]);

  pipeline.on("task", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().counter = 1;
      Ok::<PipelineControl, FlowError>(PipelineControl::Continue)
    })
  });

  let ctx = ContextData::new(TestContext::default());
  assert!(pipeline.run(ctx.clone()).await.is_ok());
  assert_eq!(ctx.read().counter, 1);

  let mut failing_pipeline = Pipeline::<TestContext, FlowError>::new("flow_fail", &[("fail_task", false, None)]);
  failing_pipeline.on("fail_task", |_ctx| {
    Box::pin(async move { Err(FlowError::Internal("Intentional FlowError".to_string())) })
  });
  let fail_result = failing_pipeline.run(ContextData::new(TestContext::default())).await;
  match fail_result.err().unwrap() {
    FlowError::Internal(s) => assert_eq!(s, "Intentional FlowError"),
    other => panic!("Expected FlowError::Internal, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_anyhow_hook_errors_become_handler_errors() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, FlowError>::new("anyhow", &[("task", false, None)]);
  pipeline.on("task", |_ctx: ContextData<TestContext>| {
    Box::pin(async move { Err::<PipelineControl, _>(anyhow::anyhow!("upstream exploded")) })
  });

  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  match result.err().unwrap() {
    FlowError::Handler { source } => assert_eq!(source.to_string(), "upstream exploded"),
    other => panic!("Expected FlowError::Handler, got {:?}", other),
  }
}

#[test]
fn test_flow_error_survives_anyhow_round_trip() {
  let wrapped = anyhow::Error::new(FlowError::StepNotFound {
    step_name: "x".to_string(),
  });
  assert!(matches!(FlowError::from(wrapped), FlowError::StepNotFound { .. }));
}
