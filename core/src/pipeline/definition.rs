// src/pipeline/definition.rs

use crate::core::context::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::{FlowError, FlowResult};
use std::collections::HashMap;
use std::sync::Arc;

/// An ordered set of named steps over a root context `TData`.
///
/// `Err` is what the handlers return; it must absorb engine failures through
/// `From<FlowError>` so that a run always yields a single error type.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,

  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional, skip_if)` triples, in execution order.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
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

  /// Registering a handler on an unknown step is a wiring bug, so it panics
  /// at setup time rather than surfacing on the first request.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("stepflow setup error: step '{}' is not defined in this pipeline", step_name);
    }
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> FlowResult<()> {
    self.step_mut(step_name)?.optional = optional;
    Ok(())
  }

  /// Skips `step_name` whenever `condition` holds for the context at the time
  /// the step is reached.
  pub fn set_skip_condition(
    &mut self,
    step_name: &str,
    condition: impl Fn(&TData) -> bool + Send + Sync + 'static,
  ) -> FlowResult<()> {
    let condition: SkipCondition<TData> = Arc::new(condition);
    self.step_mut(step_name)?.skip_if = Some(condition);
    Ok(())
  }

  /// Removes a step together with all of its handlers.
  pub fn remove_step(&mut self, step_name: &str) -> FlowResult<()> {
    let idx = self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })?;
    self.steps.remove(idx);
    self.before.remove(step_name);
    self.on.remove(step_name);
    self.after.remove(step_name);
    Ok(())
  }
}
