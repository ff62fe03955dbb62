//! Integration tests for `--dry-run` and `--json` plans

use crate::helpers::{TestRoot, run_walker, run_walker_failing};
use anyhow::Result;
use serde_json::Value;

const RELEASE_ONLY: &str = r#"projects:
  - name: undistro
    repo: https://github.com/getupio-undistro/undistro.git
    version: v0.1.0
    releaseCommand: {name: make, args: [release]}
"#;

fn plan(root: &TestRoot, args: &[&str]) -> Result<Vec<Value>> {
  let mut full = vec!["--json"];
  full.extend_from_slice(args);
  let output = run_walker(&root.path, &full)?;
  let json: Value = serde_json::from_slice(&output.stdout)?;
  Ok(json.as_array().cloned().unwrap_or_default())
}

fn programs(steps: &[Value]) -> Vec<String> {
  steps
    .iter()
    .filter_map(|s| s["program"].as_str().map(String::from))
    .collect()
}

#[test]
fn test_json_plan_with_cleanup() -> Result<()> {
  let root = TestRoot::new()?;
  root.add_version("v1.19", RELEASE_ONLY)?;

  let steps = plan(&root, &[])?;
  let actions: Vec<&str> = steps.iter().filter_map(|s| s["action"].as_str()).collect();

  assert_eq!(actions, vec!["run", "run", "run", "run", "capture", "remove_dir"]);
  assert_eq!(programs(&steps), vec!["git", "git", "make", "docker", "docker"]);
  assert_eq!(steps[0]["args"][0], "clone");
  assert_eq!(steps[1]["args"][3], "tags/v0.1.0");
  assert!(steps[2]["cwd"].as_str().unwrap_or_default().ends_with("undistro"));
  assert!(steps[5]["path"].as_str().unwrap_or_default().ends_with("undistro"));

  assert!(!root.file_exists("undistro"), "dry run must not clone");
  Ok(())
}

#[test]
fn test_text_plan_without_cleanup() -> Result<()> {
  let root = TestRoot::new()?;
  root.add_version("v1.19", RELEASE_ONLY)?;

  let output = run_walker(&root.path, &["--dry-run", "--clean=false"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  let lines: Vec<&str> = stdout.lines().collect();

  assert_eq!(lines.len(), 3, "stdout: {}", stdout);
  assert!(lines[0].contains("git clone https://github.com/getupio-undistro/undistro.git undistro"));
  assert!(lines[2].contains("make release"));
  Ok(())
}

#[test]
fn test_versions_flag_limits_directories() -> Result<()> {
  let root = TestRoot::new()?;
  root.add_version("v1.19", &RELEASE_ONLY.replace("undistro", "old"))?;
  root.add_version("v1.20", &RELEASE_ONLY.replace("undistro", "new"))?;

  let steps = plan(&root, &["--clean=false", "--versions", "v1.20"])?;
  let clones: Vec<&str> = steps
    .iter()
    .filter(|s| s["args"][0] == "clone")
    .filter_map(|s| s["args"][2].as_str())
    .collect();

  assert_eq!(clones, vec!["new"]);
  Ok(())
}

#[test]
fn test_version_policy_semver() -> Result<()> {
  let root = TestRoot::new()?;
  root.add_version("v2.0.0", RELEASE_ONLY)?;

  let default_policy = plan(&root, &["--clean=false", "--all-versions"])?;
  assert!(default_policy.is_empty());

  let semver = plan(
    &root,
    &["--clean=false", "--all-versions", "--version-policy", "semver"],
  )?;
  assert_eq!(programs(&semver), vec!["git", "git", "make"]);
  Ok(())
}

#[test]
fn test_settings_file_is_applied() -> Result<()> {
  let root = TestRoot::new()?;
  root.add_version("v3.1", RELEASE_ONLY)?;
  root.write_settings(
    r#"
[walk]
versions = ["v3.1"]

[cleanup]
container_runtime = "podman"
"#,
  )?;

  let steps = plan(&root, &[])?;
  assert_eq!(programs(&steps), vec!["git", "git", "make", "podman", "podman"]);
  Ok(())
}

#[test]
fn test_invalid_manifest_is_fatal() -> Result<()> {
  let root = TestRoot::new()?;
  root.add_version("v1.19", "projects:\n  - name: ../escape\n    repo: r\n    version: v1\n")?;

  let output = run_walker_failing(&root.path, &["--dry-run"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("invalid project '../escape'"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_versions_conflicts_with_all_versions() -> Result<()> {
  let root = TestRoot::new()?;
  run_walker_failing(&root.path, &["--versions", "v1.19", "--all-versions"])?;
  Ok(())
}
