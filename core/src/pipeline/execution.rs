// storelink/core/src/pipeline/execution.rs

//! `Pipeline::run`: walks the steps in order and drives each phase's hooks.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::{Handler, Phase};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes every step against `ctx_data`.
  ///
  /// Per step: evaluate `skip_if`; a step with no hooks is skipped when
  /// optional and fails with [`FlowError::HandlerMissing`] otherwise; then the
  /// `before`, `on` and `after` hooks run in registration order. The first
  /// `Stop` ends the run with [`PipelineResult::Stopped`], the first error is
  /// returned as-is.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline = %self.label,
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "pipeline run starting");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(parent: &step_span, Level::DEBUG, "step skipped by condition");
          continue;
        }
      }

      let hooks = match self.hooks.get(step_name) {
        Some(hooks) if !hooks.is_empty() => hooks,
        _ if step_def.optional => {
          event!(parent: &step_span, Level::DEBUG, "optional step has no hooks, skipping");
          continue;
        }
        _ => {
          event!(parent: &step_span, Level::ERROR, "required step has no hooks");
          return Err(Err::from(FlowError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      for phase in Phase::ALL {
        let outcome = run_phase(phase, hooks.phase(phase), &ctx_data)
          .instrument(step_span.clone())
          .await?;
        if outcome == PipelineControl::Stop {
          event!(parent: &step_span, Level::INFO, %phase, "pipeline stopped by hook");
          return Ok(PipelineResult::Stopped);
        }
      }
      event!(parent: &step_span, Level::DEBUG, "step finished");
    }

    event!(Level::DEBUG, "pipeline run completed");
    Ok(PipelineResult::Completed)
  }
}

async fn run_phase<TData, Err>(
  phase: Phase,
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> Result<PipelineControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (hook_idx, handler_fn) in handlers.iter().enumerate() {
    let hook_span = span!(Level::DEBUG, "hook", %phase, hook_index = hook_idx);
    match handler_fn(ctx_data.clone()).instrument(hook_span).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => return Ok(PipelineControl::Stop),
      Err(e) => {
        event!(Level::WARN, %phase, hook_index = hook_idx, error = %e, "hook failed");
        return Err(e);
      }
    }
  }
  Ok(PipelineControl::Continue)
}
