// src/core/control.rs

/// Answer of a single handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Run the next handler, phase or step.
  Continue,
  /// Halt the whole run; nothing after this handler executes.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step was executed or skipped.
  Completed,
  /// A handler returned [`PipelineControl::Stop`].
  Stopped,
}
