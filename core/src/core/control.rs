// storelink/core/src/core/control.rs

//! Flow signals returned by hooks and the overall outcome of a run.

/// Returned by every hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Keep going: remaining hooks of this step, then the next step.
  Continue,
  /// End the run now. Nothing after this hook executes.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran (or was skipped/optional-empty).
  Completed,
  /// A hook returned [`PipelineControl::Stop`].
  Stopped,
}

impl PipelineResult {
  pub fn is_completed(&self) -> bool {
    matches!(self, PipelineResult::Completed)
  }
}
