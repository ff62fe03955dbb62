//! Release manifest (`config.yaml`) for one version directory
//!
//! # Example
//!
//! ```yaml
//! projects:
//!   - name: undistro
//!     repo: https://github.com/getupio-undistro/undistro.git
//!     version: v0.1.0
//!     releaseCommand: {name: make, args: [release]}
//!     env:
//!       - {name: GOFLAGS, value: -mod=vendor}
//! ```
//!
//! Keys that are missing take their defaults and unknown keys are ignored. The file is
//! decoded as YAML, so JSON manifests load as well.

use crate::core::error::{ConfigError, WalkError, WalkResult};
use crate::release::pipeline::Stage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// File name looked up in every matched version directory
pub const MANIFEST_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
  /// Projects in execution order
  #[serde(default)]
  pub projects: Vec<Project>,
}

/// One repository to clone, tag and release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  /// Directory the repository is cloned into (under the walk root)
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub repo: String,
  /// Tag to check out
  #[serde(default)]
  pub version: String,
  #[serde(default)]
  pub before_release_command: CommandSpec,
  #[serde(default)]
  pub release_command: CommandSpec,
  #[serde(default)]
  pub after_release_command: CommandSpec,
  #[serde(default)]
  pub package_binaries_command: CommandSpec,
  #[serde(default)]
  pub package_images_command: CommandSpec,
  #[serde(default)]
  pub env: Vec<EnvVar>,
}

/// An external command; an empty `name` means "not declared"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub args: Vec<String>,
}

impl CommandSpec {
  pub fn is_declared(&self) -> bool {
    !self.name.is_empty()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub value: String,
}

impl Project {
  /// The five command slots in pipeline order, declared or not
  pub fn stages(&self) -> [(Stage, &CommandSpec); 5] {
    [
      (Stage::BeforeRelease, &self.before_release_command),
      (Stage::Release, &self.release_command),
      (Stage::AfterRelease, &self.after_release_command),
      (Stage::PackageBinaries, &self.package_binaries_command),
      (Stage::PackageImages, &self.package_images_command),
    ]
  }

  /// Only the declared commands, in pipeline order
  pub fn declared_stages(&self) -> impl Iterator<Item = (Stage, &CommandSpec)> {
    self.stages().into_iter().filter(|(_, cmd)| cmd.is_declared())
  }

  /// Check the fields the pipeline depends on
  pub fn validate(&self) -> Result<(), String> {
    let mut components = Path::new(&self.name).components();
    match (components.next(), components.next()) {
      (Some(Component::Normal(c)), None) if c == self.name.as_str() => {}
      _ => {
        return Err(format!(
          "name '{}' must be a single directory name (no separators, '.' or '..')",
          self.name
        ));
      }
    }

    if self.repo.trim().is_empty() {
      return Err("repo is empty".to_string());
    }
    if self.version.trim().is_empty() {
      return Err("version is empty".to_string());
    }

    for var in &self.env {
      if var.name.is_empty() || var.name.contains('=') || var.name.contains('\0') {
        return Err(format!("invalid environment variable name '{}'", var.name));
      }
    }

    Ok(())
  }
}

impl ReleaseManifest {
  /// Load `config.yaml` from a version directory
  ///
  /// A missing, unreadable, undecodable or invalid manifest is an error; callers treat it
  /// as fatal for the whole walk.
  pub fn load(dir: &Path) -> WalkResult<Self> {
    let path = dir.join(MANIFEST_FILE);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(WalkError::Config(ConfigError::ManifestNotFound { dir: dir.to_path_buf() }));
      }
      Err(e) => return Err(unreadable(&path, e.to_string())),
    };

    let manifest = Self::parse(&content).map_err(|e| unreadable(&path, e.to_string()))?;

    for (index, project) in manifest.projects.iter().enumerate() {
      project.validate().map_err(|reason| {
        WalkError::Config(ConfigError::InvalidProject {
          path: path.clone(),
          project: if project.name.is_empty() {
            format!("#{}", index + 1)
          } else {
            project.name.clone()
          },
          reason,
        })
      })?;
    }

    Ok(manifest)
  }

  /// Decode manifest text. An empty document is an empty manifest.
  pub fn parse(content: &str) -> Result<Self, serde_yml::Error> {
    if content.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yml::from_str(content)
  }
}

fn unreadable(path: &Path, reason: String) -> WalkError {
  WalkError::Config(ConfigError::ManifestUnreadable {
    path: PathBuf::from(path),
    reason,
  })
}
