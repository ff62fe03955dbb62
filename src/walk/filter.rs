//! Version directory filter
//!
//! Decides whether a directory name denotes a release version that should be walked.
//! Names are checked in two steps: the syntax policy first, then the allow-list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Syntax a directory name must follow (after one optional leading `v`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VersionPolicy {
  /// Exactly two numeric components: `1.19`, `v1.19`
  #[default]
  MajorMinor,
  /// Full semantic version: `1.19.0`, `v1.19.0-rc.1`
  Semver,
}

impl VersionPolicy {
  /// Check a name against the policy
  pub fn accepts(self, name: &str) -> bool {
    let version = name.strip_prefix('v').unwrap_or(name);
    match self {
      VersionPolicy::MajorMinor => {
        let mut parts = version.split('.');
        matches!(
          (parts.next(), parts.next(), parts.next()),
          (Some(major), Some(minor), None) if is_numeric(major) && is_numeric(minor)
        )
      }
      VersionPolicy::Semver => semver::Version::parse(version).is_ok(),
    }
  }
}

impl fmt::Display for VersionPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionPolicy::MajorMinor => write!(f, "major-minor"),
      VersionPolicy::Semver => write!(f, "semver"),
    }
  }
}

fn is_numeric(s: &str) -> bool {
  !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Comma-separated list of versions to release
///
/// Matching is by substring against the joined list, so `v1.19` is allowed by
/// `"v1.18,v1.19"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
  raw: String,
}

impl AllowList {
  /// Build from a comma-separated string (`v1.18,v1.19`)
  pub fn parse(csv: &str) -> Self {
    Self { raw: csv.trim().to_string() }
  }

  /// Build from individual entries
  pub fn from_entries<I, S>(entries: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let raw = entries
      .into_iter()
      .map(|e| e.as_ref().trim().to_string())
      .collect::<Vec<_>>()
      .join(",");
    Self { raw }
  }

  pub fn allows(&self, name: &str) -> bool {
    self.raw.contains(name)
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }
}

/// Outcome of filtering one directory name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
  Accept,
  /// Name does not follow the version policy
  NotAVersion,
  /// Name is a version but is not in the allow-list
  NotAllowed,
}

/// Version policy plus optional allow-list
#[derive(Debug, Clone)]
pub struct VersionFilter {
  policy: VersionPolicy,
  allow: Option<AllowList>,
}

impl VersionFilter {
  pub fn new(policy: VersionPolicy, allow: Option<AllowList>) -> Self {
    Self { policy, allow }
  }

  pub fn policy(&self) -> VersionPolicy {
    self.policy
  }

  pub fn allow_list(&self) -> Option<&AllowList> {
    self.allow.as_ref()
  }

  pub fn evaluate(&self, name: &str) -> FilterDecision {
    if !self.policy.accepts(name) {
      return FilterDecision::NotAVersion;
    }
    match &self.allow {
      Some(allow) if !allow.allows(name) => FilterDecision::NotAllowed,
      _ => FilterDecision::Accept,
    }
  }
}
