//! Per-project execution context - the working directory and environment a pipeline runs in
//!
//! # Design
//!
//! The pipeline never calls `chdir` or `setenv` on the walker process. Instead each
//! project gets an `ExecutionContext` that remembers where its commands should run
//! and which extra variables they should see. Every external command is built from
//! the context as an [`Invocation`], so the state travels with the command:
//!
//! ```text
//! ExecutionContext::new(root)
//!   |  enter("undistro")          cwd = root/undistro
//!   |  set_env("TAG", "v0.1")     overlay = {TAG}
//!   v
//! ctx.command("make", ["release"]) -> Invocation { cwd, env, .. }
//! ```
//!
//! Dropping the context drops the overlay, so nothing set for one project is visible
//! to the next.

use crate::core::error::{WalkError, WalkResult};
use crate::core::exec::Invocation;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Working directory plus environment overlay for one project's pipeline.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
  /// Walk root (where projects are cloned)
  root: PathBuf,

  /// Directory new invocations run in
  cwd: PathBuf,

  /// Variables added on top of the inherited environment
  env: BTreeMap<String, String>,
}

impl ExecutionContext {
  /// Start a context at the walk root with an empty overlay.
  pub fn new(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
      cwd: root.to_path_buf(),
      env: BTreeMap::new(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn cwd(&self) -> &Path {
    &self.cwd
  }

  /// Move into a directory below the walk root.
  pub fn enter(&mut self, dir: &str) -> &Path {
    self.cwd = self.root.join(dir);
    &self.cwd
  }

  /// Go back to the walk root.
  pub fn restore_root(&mut self) {
    self.cwd = self.root.clone();
  }

  /// Add a variable to the overlay.
  ///
  /// Names are rejected where the OS would reject them: empty, or containing `=` or NUL.
  /// Values must not contain NUL.
  pub fn set_env(&mut self, name: &str, value: &str) -> WalkResult<()> {
    let reason = if name.is_empty() {
      Some("name is empty")
    } else if name.contains('=') {
      Some("name contains '='")
    } else if name.contains('\0') || value.contains('\0') {
      Some("contains a NUL byte")
    } else {
      None
    };

    if let Some(reason) = reason {
      return Err(WalkError::Environment {
        name: name.to_string(),
        reason: reason.to_string(),
      });
    }

    self.env.insert(name.to_string(), value.to_string());
    Ok(())
  }

  /// Remove every variable from the overlay.
  pub fn clear_env(&mut self) {
    self.env.clear();
  }

  pub fn env(&self) -> &BTreeMap<String, String> {
    &self.env
  }

  /// Build an invocation that runs in the current directory with the current overlay.
  pub fn command<I, S>(&self, program: &str, args: I) -> Invocation
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Invocation {
      program: program.to_string(),
      args: args.into_iter().map(Into::into).collect(),
      cwd: self.cwd.clone(),
      env: self.env.clone(),
    }
  }
}
