//! System executor - spawns real processes with `std::process::Command`
//!
//! Commands inherit the walker's standard streams so build output goes straight to the
//! terminal. Nothing is captured except for `capture`, and nothing is timed out.

use super::{Executor, Invocation};
use crate::core::error::{ProcessError, ResultExt, WalkError, WalkResult};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Executor backed by the operating system
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
  pub fn new() -> Self {
    Self
  }

  /// Build the `Command` for an invocation
  ///
  /// - Working directory is the invocation's cwd
  /// - The env overlay is layered on top of the inherited environment
  /// - Relative programs with a separator (`./hack/x.sh`) resolve against the cwd
  fn command(invocation: &Invocation) -> Command {
    let mut cmd = Command::new(resolve_program(&invocation.program, &invocation.cwd));
    cmd
      .args(&invocation.args)
      .current_dir(&invocation.cwd)
      .envs(&invocation.env);
    cmd
  }

  fn spawn_error(invocation: &Invocation, source: std::io::Error) -> WalkError {
    WalkError::Process(ProcessError::Spawn {
      program: invocation.program.clone(),
      command: invocation.to_string(),
      source,
    })
  }
}

impl Executor for SystemExecutor {
  fn run(&mut self, invocation: &Invocation) -> WalkResult<()> {
    debug!(command = %invocation, cwd = %invocation.cwd.display(), "running");

    let status = Self::command(invocation)
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit())
      .status()
      .map_err(|e| Self::spawn_error(invocation, e))?;

    if !status.success() {
      return Err(WalkError::Process(ProcessError::Failed {
        command: invocation.to_string(),
        code: status.code(),
        stderr: String::new(),
      }));
    }

    Ok(())
  }

  fn capture(&mut self, invocation: &Invocation) -> WalkResult<Vec<u8>> {
    debug!(command = %invocation, cwd = %invocation.cwd.display(), "capturing");

    let output = Self::command(invocation)
      .stdin(Stdio::null())
      .output()
      .map_err(|e| Self::spawn_error(invocation, e))?;

    if !output.status.success() {
      return Err(WalkError::Process(ProcessError::Failed {
        command: invocation.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(output.stdout)
  }

  fn remove_dir_all(&mut self, path: &Path) -> WalkResult<()> {
    debug!(path = %path.display(), "removing directory");
    std::fs::remove_dir_all(path).with_context(|| format!("Failed to delete {}", path.display()))
  }
}

/// Resolve a relative program path that contains a separator against `cwd`.
///
/// Bare names (`git`, `make`) are left for PATH lookup; absolute paths are kept.
fn resolve_program(program: &str, cwd: &Path) -> PathBuf {
  let path = Path::new(program);
  if path.is_relative() && path.components().count() > 1 {
    cwd.join(path)
  } else {
    path.to_path_buf()
  }
}
