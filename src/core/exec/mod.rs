//! Process execution seam
//!
//! The pipeline describes *what* to run as [`Invocation`]s and hands them to an
//! [`Executor`]. `SystemExecutor` spawns real processes; `RecordingExecutor` only
//! writes them down, which is what dry runs and tests use.

mod recording;
mod system;

pub use recording::{PlannedStep, RecordingExecutor};
pub use system::SystemExecutor;

use crate::core::error::WalkResult;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// One external command, fully resolved against its execution context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  /// Added on top of the walker's own environment
  pub env: BTreeMap<String, String>,
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Runs pipeline steps.
///
/// All methods block until the step is finished. A step that does not succeed is an error.
pub trait Executor {
  /// Run with the walker's stdin/stdout/stderr attached.
  fn run(&mut self, invocation: &Invocation) -> WalkResult<()>;

  /// Run and return what the process wrote to stdout.
  fn capture(&mut self, invocation: &Invocation) -> WalkResult<Vec<u8>>;

  /// Recursively delete a directory.
  fn remove_dir_all(&mut self, path: &Path) -> WalkResult<()>;
}
