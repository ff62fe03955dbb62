use crate::core::error::{ConfigError, ResultExt, WalkError, WalkResult};
use crate::walk::filter::VersionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Versions released when neither the CLI nor the settings file says otherwise
pub const DEFAULT_VERSIONS: &[&str] = &["v1.18", "v1.19", "v1.20", "v1.21"];

/// Settings for release-walker
/// Searched in order: release-walker.toml, .release-walker.toml, .config/release-walker.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkerConfig {
  #[serde(default)]
  pub walk: WalkConfig,
  #[serde(default)]
  pub cleanup: CleanupConfig,
}

/// Which version directories are processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
  /// Allow-list of version directory names
  #[serde(default = "default_versions")]
  pub versions: Vec<String>,

  /// Process every version directory, ignoring `versions`
  #[serde(default)]
  pub all_versions: bool,

  /// Syntax a directory name must have to count as a version
  #[serde(default)]
  pub version_policy: VersionPolicy,
}

fn default_versions() -> Vec<String> {
  DEFAULT_VERSIONS.iter().map(|v| v.to_string()).collect()
}

impl Default for WalkConfig {
  fn default() -> Self {
    Self {
      versions: default_versions(),
      all_versions: false,
      version_policy: VersionPolicy::default(),
    }
  }
}

/// Post-pipeline cleanup of build artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupConfig {
  /// Run cleanup after each project (default: true)
  #[serde(default = "default_true")]
  pub enabled: bool,

  /// Container runtime binary used for prune and volume listing (default: "docker")
  #[serde(default = "default_container_runtime")]
  pub container_runtime: String,

  /// Script that removes leftover volumes, relative to the walk root
  /// (default: "./hack/clean-volumes.sh")
  #[serde(default = "default_volume_script")]
  pub volume_script: String,
}

fn default_true() -> bool {
  true
}

fn default_container_runtime() -> String {
  "docker".to_string()
}

fn default_volume_script() -> String {
  "./hack/clean-volumes.sh".to_string()
}

impl Default for CleanupConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      container_runtime: default_container_runtime(),
      volume_script: default_volume_script(),
    }
  }
}

impl CleanupConfig {
  /// Validate cleanup configuration
  pub fn validate(&self) -> Result<(), String> {
    if self.container_runtime.trim().is_empty() {
      return Err("cleanup.container_runtime must not be empty".to_string());
    }
    if self.volume_script.trim().is_empty() {
      return Err("cleanup.volume_script must not be empty".to_string());
    }
    Ok(())
  }
}

impl WalkerConfig {
  /// Find settings file in search order: release-walker.toml, .release-walker.toml, .config/release-walker.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release-walker.toml"),
      path.join(".release-walker.toml"),
      path.join(".config").join("release-walker.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load settings from the walk root, or built-in defaults when no file exists
  pub fn load(root: &Path) -> WalkResult<Self> {
    let Some(config_path) = Self::find_config_path(root) else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read settings from {}", config_path.display()))?;
    let config: WalkerConfig = toml_edit::de::from_str(&content).map_err(|e| {
      WalkError::Config(ConfigError::InvalidSettings {
        path: config_path.clone(),
        reason: e.to_string(),
      })
    })?;

    config.cleanup.validate().map_err(|reason| {
      WalkError::Config(ConfigError::InvalidSettings {
        path: config_path.clone(),
        reason,
      })
    })?;

    Ok(config)
  }
}
