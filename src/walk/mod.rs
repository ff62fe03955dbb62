//! Walk orchestrator
//!
//! Finds version directories under the walk root and releases every project their
//! manifests declare. Discovery completes before the first pipeline starts, so clones
//! created in the root during the walk are never mistaken for version directories.

pub mod filter;

use crate::core::config::CleanupConfig;
use crate::core::error::WalkResult;
use crate::core::exec::Executor;
use crate::release::manifest::ReleaseManifest;
use crate::release::pipeline::PipelineRunner;
use filter::{FilterDecision, VersionFilter};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Counts reported at the end of a walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
  /// Version directories that passed the filter
  pub directories: usize,
  /// Directories skipped by the filter
  pub skipped: usize,
  /// Projects whose pipeline completed
  pub projects: usize,
}

/// Result of scanning the walk root
#[derive(Debug, Clone, Default)]
pub struct Discovery {
  /// Matched version directories in traversal order
  pub matched: Vec<PathBuf>,
  pub skipped: usize,
}

/// Recursively list directories under `root` (root included) that pass `filter`.
///
/// `.git` directories are never entered. Siblings are visited in file-name order.
pub fn discover(root: &Path, filter: &VersionFilter) -> WalkResult<Discovery> {
  let mut discovery = Discovery::default();

  let entries = WalkDir::new(root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| e.file_name() != OsStr::new(".git"));

  for entry in entries {
    let entry = entry?;
    if !entry.file_type().is_dir() {
      continue;
    }

    let name = entry.file_name().to_string_lossy();
    debug!(directory = %name, "visiting");

    match filter.evaluate(&name) {
      FilterDecision::Accept => discovery.matched.push(entry.path().to_path_buf()),
      FilterDecision::NotAVersion => {
        warn!("ignoring {}: not a {} version", name, filter.policy());
        discovery.skipped += 1;
      }
      FilterDecision::NotAllowed => {
        let versions = filter.allow_list().map(|a| a.as_str()).unwrap_or_default();
        warn!("ignoring {}: does not match versions {}", name, versions);
        discovery.skipped += 1;
      }
    }
  }

  Ok(discovery)
}

/// Walks a root and releases every matched version directory
pub struct Walker<'a> {
  root: &'a Path,
  filter: &'a VersionFilter,
  cleanup: Option<&'a CleanupConfig>,
}

impl<'a> Walker<'a> {
  /// `cleanup` is `None` when cleanup is disabled
  pub fn new(root: &'a Path, filter: &'a VersionFilter, cleanup: Option<&'a CleanupConfig>) -> Self {
    Self { root, filter, cleanup }
  }

  /// Run the walk. The first error (manifest or pipeline) stops it.
  pub fn run<E: Executor + ?Sized>(&self, executor: &mut E) -> WalkResult<WalkSummary> {
    let discovery = discover(self.root, self.filter)?;
    let mut summary = WalkSummary {
      directories: discovery.matched.len(),
      skipped: discovery.skipped,
      projects: 0,
    };

    for dir in &discovery.matched {
      let manifest = ReleaseManifest::load(dir)?;
      info!(
        directory = %dir.display(),
        projects = manifest.projects.len(),
        "loaded release manifest"
      );

      let mut runner = PipelineRunner::new(&mut *executor, self.root, self.cleanup);
      for project in &manifest.projects {
        runner.run(project)?;
        summary.projects += 1;
      }
    }

    Ok(summary)
  }
}
