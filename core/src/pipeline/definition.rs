// storelink/core/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and its structural operations.

use crate::core::step::{Handler, Phase, SkipCondition, StepDef};
use crate::error::{FlowError, FlowResult};
use std::collections::HashMap;

/// Hooks attached to one step, grouped by phase.
pub(crate) struct StepHooks<TData, Err>
where
  TData: 'static + Send + Sync,
{
  pub(crate) before: Vec<Handler<TData, Err>>,
  pub(crate) on: Vec<Handler<TData, Err>>,
  pub(crate) after: Vec<Handler<TData, Err>>,
}

impl<TData, Err> Default for StepHooks<TData, Err>
where
  TData: 'static + Send + Sync,
{
  fn default() -> Self {
    Self {
      before: Vec::new(),
      on: Vec::new(),
      after: Vec::new(),
    }
  }
}

impl<TData, Err> StepHooks<TData, Err>
where
  TData: 'static + Send + Sync,
{
  pub(crate) fn phase(&self, phase: Phase) -> &[Handler<TData, Err>] {
    match phase {
      Phase::Before => &self.before,
      Phase::On => &self.on,
      Phase::After => &self.after,
    }
  }

  pub(crate) fn phase_mut(&mut self, phase: Phase) -> &mut Vec<Handler<TData, Err>> {
    match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    }
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.before.is_empty() && self.on.is_empty() && self.after.is_empty()
  }
}

/// An ordered list of named steps over context data `TData`, whose hooks fail with `Err`.
///
/// `Err` must be constructible from [`FlowError`] so that engine-level failures
/// (a required step without hooks, for instance) surface in the caller's error type.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) label: String,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) hooks: HashMap<String, StepHooks<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Builds a pipeline from `(name, optional, skip_if)` triples, in execution order.
  pub fn new(label: &str, step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      label: label.to_string(),
      steps,
      hooks: HashMap::new(),
    }
  }

  pub fn label(&self) -> &str {
    &self.label
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn has_step(&self, step_name: &str) -> bool {
    self.steps.iter().any(|s| s.name == step_name)
  }

  /// Number of hooks registered for `step_name` in `phase`.
  pub fn hook_count(&self, step_name: &str, phase: Phase) -> usize {
    self.hooks.get(step_name).map_or(0, |h| h.phase(phase).len())
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> FlowResult<()> {
    self.step_mut(step_name)?.optional = optional;
    Ok(())
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) -> FlowResult<()> {
    self.step_mut(step_name)?.skip_if = skip_if;
    Ok(())
  }

  fn step_mut(&mut self, step_name: &str) -> FlowResult<&mut StepDef<TData>> {
    self
      .steps
      .iter_mut()
      .find(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  /// Panics on unknown step names: hook wiring happens once at startup and a typo there is a programming error.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.has_step(step_name) {
      panic!(
        "pipeline '{}': step '{}' is not part of the definition",
        self.label, step_name
      );
    }
  }
}
