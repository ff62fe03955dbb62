//! Project pipeline runner
//!
//! Runs one project end to end:
//!
//! ```text
//! clone -> checkout tag -> env -> before -> release -> after -> binaries -> images
//!       -> back to root -> [cleanup: prune, volume ls, volume script, rm -rf, clear env]
//! ```
//!
//! Every step goes through an [`Executor`]; the first failure stops the pipeline and is
//! returned wrapped with the stage that failed.

use crate::core::config::CleanupConfig;
use crate::core::context::ExecutionContext;
use crate::core::error::{WalkError, WalkResult};
use crate::core::exec::Executor;
use crate::release::manifest::Project;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Every step of a project pipeline, in the order it runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Clone,
  Checkout,
  Environment,
  BeforeRelease,
  Release,
  AfterRelease,
  PackageBinaries,
  PackageImages,
  Prune,
  VolumeList,
  VolumeCleanup,
  RemoveProject,
}

impl Stage {
  /// Short label used in logs and error messages
  pub fn label(self) -> &'static str {
    match self {
      Stage::Clone => "git clone",
      Stage::Checkout => "checkout",
      Stage::Environment => "setenv",
      Stage::BeforeRelease => "before-release",
      Stage::Release => "release",
      Stage::AfterRelease => "after-release",
      Stage::PackageBinaries => "package-binaries",
      Stage::PackageImages => "package-images",
      Stage::Prune => "container prune",
      Stage::VolumeList => "container volume ls",
      Stage::VolumeCleanup => "volume cleanup",
      Stage::RemoveProject => "project directory removal",
    }
  }

  pub(crate) fn help_message(self) -> Option<String> {
    match self {
      Stage::Clone => Some(
        "Check that the repository is reachable and that no directory with the project's name \
         is left in the walk root from an earlier run."
          .to_string(),
      ),
      Stage::Checkout => Some("Check that the project's `version` exists as a tag in the repository.".to_string()),
      Stage::VolumeCleanup => Some("The volume script path is resolved against the walk root.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Runs project pipelines against an executor
pub struct PipelineRunner<'a, E: Executor + ?Sized> {
  executor: &'a mut E,
  root: &'a Path,
  cleanup: Option<&'a CleanupConfig>,
}

impl<'a, E: Executor + ?Sized> PipelineRunner<'a, E> {
  /// `cleanup` is `None` when cleanup is disabled
  pub fn new(executor: &'a mut E, root: &'a Path, cleanup: Option<&'a CleanupConfig>) -> Self {
    Self {
      executor,
      root,
      cleanup,
    }
  }

  /// Run the full pipeline for one project
  pub fn run(&mut self, project: &Project) -> WalkResult<()> {
    info!(project = %project.name, repo = %project.repo, version = %project.version, "releasing project");

    let mut ctx = ExecutionContext::new(self.root);
    let name = project.name.as_str();

    let clone = ctx.command("git", ["clone", project.repo.as_str(), name]);
    self.executor.run(&clone).map_err(|e| WalkError::stage(name, Stage::Clone, e))?;

    ctx.enter(name);
    let checkout = ctx.command(
      "git",
      [
        "-c".to_string(),
        "advice.detachedHead=false".to_string(),
        "checkout".to_string(),
        format!("tags/{}", project.version),
      ],
    );
    self
      .executor
      .run(&checkout)
      .map_err(|e| WalkError::stage(name, Stage::Checkout, e))?;

    for var in &project.env {
      ctx
        .set_env(&var.name, &var.value)
        .map_err(|e| WalkError::stage(name, Stage::Environment, e))?;
    }
    debug!(project = %name, cwd = %ctx.cwd().display(), vars = ctx.env().len(), "project context ready");

    for (stage, command) in project.declared_stages() {
      info!(project = %name, stage = %stage, "running stage");
      let invocation = ctx.command(&command.name, command.args.iter().cloned());
      self.executor.run(&invocation).map_err(|e| WalkError::stage(name, stage, e))?;
    }

    ctx.restore_root();

    if let Some(cleanup) = self.cleanup {
      self.clean(&mut ctx, name, cleanup)?;
    }

    Ok(())
  }

  /// Remove build leftovers for a project; `ctx` must be back at the walk root
  fn clean(&mut self, ctx: &mut ExecutionContext, name: &str, cleanup: &CleanupConfig) -> WalkResult<()> {
    info!(project = %name, "cleaning up");
    let runtime = cleanup.container_runtime.as_str();

    let prune = ctx.command(runtime, ["system", "prune", "-fa"]);
    self.executor.run(&prune).map_err(|e| WalkError::stage(name, Stage::Prune, e))?;

    let list = ctx.command(runtime, ["volume", "ls", "-q"]);
    let volumes = self
      .executor
      .capture(&list)
      .map_err(|e| WalkError::stage(name, Stage::VolumeList, e))?;

    if volumes.iter().any(|b| !b.is_ascii_whitespace()) {
      let script = ctx.command(&cleanup.volume_script, Vec::<String>::new());
      self
        .executor
        .run(&script)
        .map_err(|e| WalkError::stage(name, Stage::VolumeCleanup, e))?;
    } else {
      debug!(project = %name, "no container volumes to remove");
    }

    let project_dir = ctx.root().join(name);
    self
      .executor
      .remove_dir_all(&project_dir)
      .map_err(|e| WalkError::stage(name, Stage::RemoveProject, e))?;

    ctx.clear_env();
    Ok(())
  }
}
