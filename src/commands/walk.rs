//! Walk command implementation
//!
//! Resolves settings (CLI flag > release-walker.toml > built-in default), then walks
//! the root either for real or, with `--dry-run`/`--json`, against the recording
//! executor to print the plan.

use crate::core::config::{CleanupConfig, WalkerConfig};
use crate::core::error::{ResultExt, WalkResult};
use crate::core::exec::{RecordingExecutor, SystemExecutor};
use crate::walk::Walker;
use crate::walk::filter::{AllowList, VersionFilter, VersionPolicy};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Walk options as given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct WalkArgs {
  pub root: Option<PathBuf>,
  pub clean: Option<bool>,
  pub versions: Option<String>,
  pub all_versions: bool,
  pub version_policy: Option<VersionPolicy>,
  pub dry_run: bool,
  pub json: bool,
}

/// Settings after merging CLI flags over the settings file
#[derive(Debug, Clone)]
pub struct WalkSettings {
  pub filter: VersionFilter,
  /// `None` when cleanup is disabled
  pub cleanup: Option<CleanupConfig>,
}

impl WalkSettings {
  pub fn resolve(config: &WalkerConfig, args: &WalkArgs) -> Self {
    let policy = args.version_policy.unwrap_or(config.walk.version_policy);

    let allow = if args.all_versions {
      None
    } else if let Some(csv) = &args.versions {
      Some(AllowList::parse(csv))
    } else if config.walk.all_versions {
      None
    } else {
      Some(AllowList::from_entries(&config.walk.versions))
    };

    let clean = args.clean.unwrap_or(config.cleanup.enabled);
    let cleanup = clean.then(|| CleanupConfig {
      enabled: true,
      ..config.cleanup.clone()
    });

    Self {
      filter: VersionFilter::new(policy, allow),
      cleanup,
    }
  }
}

/// Run the walk command
pub fn run_walk(args: WalkArgs) -> WalkResult<()> {
  let root = match &args.root {
    Some(root) => root.clone(),
    None => env::current_dir().context("Failed to get current directory")?,
  };
  let root = root
    .canonicalize()
    .with_context(|| format!("Failed to resolve walk root {}", root.display()))?;

  let config = WalkerConfig::load(&root)?;
  let settings = WalkSettings::resolve(&config, &args);

  info!("root: {}", root.display());
  info!("clean: {}", settings.cleanup.is_some());
  match settings.filter.allow_list() {
    Some(allow) => info!("versions to build: {:?}", allow.as_str()),
    None => info!("versions to build: all"),
  }
  info!("version policy: {}", settings.filter.policy());

  let walker = Walker::new(&root, &settings.filter, settings.cleanup.as_ref());

  let summary = if args.dry_run || args.json {
    let mut executor = RecordingExecutor::new();
    let summary = walker.run(&mut executor)?;
    if args.json {
      println!("{}", serde_json::to_string_pretty(executor.steps())?);
    } else {
      for step in executor.steps() {
        println!("{}", step);
      }
    }
    summary
  } else {
    walker.run(&mut SystemExecutor::new())?
  };

  info!(
    directories = summary.directories,
    skipped = summary.skipped,
    projects = summary.projects,
    "walk finished"
  );

  Ok(())
}
