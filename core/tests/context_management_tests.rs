// storelink/core/tests/context_management_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storelink_flow::{ContextData, FlowError, Pipeline, PipelineControl};

#[tokio::test]
#[serial]
async fn test_context_data_is_shared_and_modified() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(
    "shared",
    &[("step1_modify", false, None), ("step2_read_modify", false, None)],
  );

  pipeline.on("step1_modify", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter = 10;
      guard.message = "SetByStep1".to_string();
      Ok::<PipelineControl, FlowError>(PipelineControl::Continue)
    })
  });

  pipeline.on("step2_read_modify", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      assert_eq!(guard.counter, 10);
      assert_eq!(guard.message, "SetByStep1");
      guard.counter += 5;
      guard.message.push_str("_ThenStep2");
      Ok::<PipelineControl, FlowError>(PipelineControl::Continue)
    })
  });

  let initial_ctx = ContextData::new(TestContext::default());
  pipeline.run(initial_ctx.clone()).await.unwrap();

  let final_guard = initial_ctx.read();
  assert_eq!(final_guard.counter, 15);
  assert_eq!(final_guard.message, "SetByStep1_ThenStep2");
}

#[tokio::test]
#[serial]
async fn test_context_data_clone_shares_data() {
  setup_tracing();
  let original_ctx = ContextData::new(TestContext {
    counter: 1,
    ..Default::default()
  });
  let cloned_ctx = original_ctx.clone();
  assert_eq!(original_ctx.handle_count(), 2);

  original_ctx.with_write(|c| c.counter = 5);
  assert_eq!(cloned_ctx.with_read(|c| c.counter), 5);

  cloned_ctx.write().counter = 10;
  assert_eq!(original_ctx.snapshot().counter, 10);
}

// Guards are scoped so none is held across the await.
#[tokio::test]
#[serial]
async fn test_context_data_locks_with_await() {
  setup_tracing();
  let ctx = ContextData::new(TestContext::default());

  let handler_logic = async {
    let initial_count = ctx.read().counter;
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    ctx.write().counter = initial_count + 1;
  };

  handler_logic.await;
  assert_eq!(ctx.read().counter, 1);
}

#[tokio::test]
#[serial]
async fn test_hook_can_await_between_lock_scopes() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new("await", &[("slow", false, None)]);
  pipeline.on("slow", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let start = ctx.read().counter;
      tokio::task::yield_now().await;
      ctx.write().counter = start + 7;
      Ok::<_, FlowError>(PipelineControl::Continue)
    })
  });

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().counter, 7);
}
