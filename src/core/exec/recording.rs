//! Recording executor - writes steps down instead of running them
//!
//! Backs `--dry-run`/`--json` and every pipeline test. Captured output is empty unless
//! a canned value is configured, so a dry run never plans the volume cleanup script.

use super::{Executor, Invocation};
use crate::core::error::{ProcessError, WalkError, WalkResult};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One step the pipeline asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedStep {
  /// Run with inherited stdio
  Run(Invocation),

  /// Run and capture stdout
  Capture(Invocation),

  /// Recursively delete a directory
  RemoveDir { path: PathBuf },
}

impl PlannedStep {
  /// Program name for process steps
  #[cfg(test)]
  pub fn program(&self) -> Option<&str> {
    match self {
      PlannedStep::Run(inv) | PlannedStep::Capture(inv) => Some(&inv.program),
      PlannedStep::RemoveDir { .. } => None,
    }
  }
}

impl fmt::Display for PlannedStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PlannedStep::Run(inv) => write!(f, "run      {}  (in {})", inv, inv.cwd.display()),
      PlannedStep::Capture(inv) => write!(f, "capture  {}  (in {})", inv, inv.cwd.display()),
      PlannedStep::RemoveDir { path } => write!(f, "remove   {}", path.display()),
    }
  }
}

/// Executor that records every step in order
#[derive(Debug, Default)]
pub struct RecordingExecutor {
  steps: Vec<PlannedStep>,
  capture_output: Vec<u8>,
  fail_program: Option<String>,
}

impl RecordingExecutor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Return `output` from every `capture` call.
  #[cfg(test)]
  pub fn with_capture_output(mut self, output: impl Into<Vec<u8>>) -> Self {
    self.capture_output = output.into();
    self
  }

  /// Make every run of `program` fail with exit status 1 (after recording it).
  #[cfg(test)]
  pub fn failing(mut self, program: impl Into<String>) -> Self {
    self.fail_program = Some(program.into());
    self
  }

  pub fn steps(&self) -> &[PlannedStep] {
    &self.steps
  }

  #[cfg(test)]
  pub fn into_steps(self) -> Vec<PlannedStep> {
    self.steps
  }

  fn check(&self, invocation: &Invocation) -> WalkResult<()> {
    match &self.fail_program {
      Some(program) if *program == invocation.program => Err(WalkError::Process(ProcessError::Failed {
        command: invocation.to_string(),
        code: Some(1),
        stderr: String::new(),
      })),
      _ => Ok(()),
    }
  }
}

impl Executor for RecordingExecutor {
  fn run(&mut self, invocation: &Invocation) -> WalkResult<()> {
    self.steps.push(PlannedStep::Run(invocation.clone()));
    self.check(invocation)
  }

  fn capture(&mut self, invocation: &Invocation) -> WalkResult<Vec<u8>> {
    self.steps.push(PlannedStep::Capture(invocation.clone()));
    self.check(invocation)?;
    Ok(self.capture_output.clone())
  }

  fn remove_dir_all(&mut self, path: &Path) -> WalkResult<()> {
    self.steps.push(PlannedStep::RemoveDir { path: path.to_path_buf() });
    Ok(())
  }
}
