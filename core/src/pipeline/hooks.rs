// storelink/core/src/pipeline/hooks.rs

//! Registration of `before`, `on` and `after` hooks.

use tracing::{event, Level};

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::core::step::{Handler, Phase};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::future::Future;

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Attaches `handler_fn` to `phase` of `step_name`.
  ///
  /// The hook may fail with any error convertible into the pipeline's `Err`, so
  /// steps written against `FlowError` and steps written against the
  /// application error can live in the same pipeline.
  pub fn hook<F, HookErr>(
    &mut self,
    phase: Phase,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HookErr>> + Send + 'static,
    HookErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let boxed: Handler<TData, Err> = Box::new(move |ctx_data| {
      let fut = handler_fn(ctx_data);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self
      .hooks
      .entry(step_name.to_string())
      .or_default()
      .phase_mut(phase)
      .push(boxed);
    event!(Level::TRACE, pipeline = %self.label, step = step_name, %phase, "hook registered");
  }

  pub fn before<F, HookErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HookErr>> + Send + 'static,
    HookErr: Into<Err> + Send + Sync + 'static,
  {
    self.hook(Phase::Before, step_name, handler_fn);
  }

  pub fn on<F, HookErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HookErr>> + Send + 'static,
    HookErr: Into<Err> + Send + Sync + 'static,
  {
    self.hook(Phase::On, step_name, handler_fn);
  }

  pub fn after<F, HookErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HookErr>> + Send + 'static,
    HookErr: Into<Err> + Send + Sync + 'static,
  {
    self.hook(Phase::After, step_name, handler_fn);
  }
}
