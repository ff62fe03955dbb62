//! Integration tests for real walks (git clones of local repositories)

use crate::helpers::{TestRoot, manifest_with_release, run_walker, run_walker_failing};
use anyhow::Result;

#[test]
fn test_release_runs_in_tagged_checkout() -> Result<()> {
  let root = TestRoot::new()?;
  let repo = root.add_source_repo("undistro", "v0.1.0")?;
  root.add_version(
    "v1.19",
    &manifest_with_release(
      "undistro",
      &repo,
      "v0.1.0",
      "cp VERSION ../released-$RELEASE_NAME.txt",
    ),
  )?;

  run_walker(&root.path, &["--clean=false", "--versions", "v1.19"])?;

  assert_eq!(root.read_file("released-undistro.txt")?, "v0.1.0\n");
  assert!(root.file_exists("undistro/VERSION"), "clone should be kept without cleanup");
  Ok(())
}

#[test]
fn test_cleanup_removes_clone() -> Result<()> {
  let root = TestRoot::new()?;
  let repo = root.add_source_repo("undistro", "v0.2.0")?;
  root.add_version(
    "v1.20",
    &manifest_with_release("undistro", &repo, "v0.2.0", "touch ../released.txt"),
  )?;
  // `true volume ls -q` prints nothing, so the volume script is never needed
  root.write_settings("[cleanup]\ncontainer_runtime = \"true\"\n")?;

  run_walker(&root.path, &[])?;

  assert!(root.file_exists("released.txt"));
  assert!(!root.file_exists("undistro"), "clone should be removed by cleanup");
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_cleanup_runs_volume_script_when_volumes_exist() -> Result<()> {
  use std::os::unix::fs::PermissionsExt;

  let root = TestRoot::new()?;
  let repo = root.add_source_repo("undistro", "v0.2.0")?;
  root.add_version("v1.21", &manifest_with_release("undistro", &repo, "v0.2.0", "true"))?;

  let hack = root.path.join("hack");
  std::fs::create_dir_all(&hack)?;
  std::fs::write(
    hack.join("fake-runtime.sh"),
    "#!/bin/sh\nif [ \"$1\" = volume ]; then echo leftover-volume; fi\n",
  )?;
  std::fs::write(hack.join("clean-volumes.sh"), "#!/bin/sh\ntouch volumes-cleaned\n")?;
  for script in ["fake-runtime.sh", "clean-volumes.sh"] {
    std::fs::set_permissions(hack.join(script), std::fs::Permissions::from_mode(0o755))?;
  }
  root.write_settings("[cleanup]\ncontainer_runtime = \"./hack/fake-runtime.sh\"\n")?;

  run_walker(&root.path, &["--versions", "v1.21"])?;

  assert!(root.file_exists("volumes-cleaned"), "volume script should run in the walk root");
  assert!(!root.file_exists("undistro"));
  Ok(())
}

#[test]
fn test_non_version_directories_are_skipped() -> Result<()> {
  let root = TestRoot::new()?;
  std::fs::create_dir_all(root.path.join("notaversion"))?;
  std::fs::create_dir_all(root.path.join("docs"))?;

  let output = run_walker(&root.path, &["--clean=false"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(stderr.contains("ignoring notaversion"), "stderr: {}", stderr);
  assert!(stderr.contains("ignoring docs"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_missing_manifest_aborts_walk() -> Result<()> {
  let root = TestRoot::new()?;
  let repo = root.add_source_repo("undistro", "v0.1.0")?;
  std::fs::create_dir_all(root.path.join("v1.18"))?;
  root.add_version("v1.19", &manifest_with_release("undistro", &repo, "v0.1.0", "true"))?;

  let output = run_walker_failing(&root.path, &["--clean=false"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(stderr.contains("config.yaml"), "stderr: {}", stderr);
  assert!(!root.file_exists("undistro"), "no project should be processed after the failure");
  Ok(())
}

#[test]
fn test_failing_stage_aborts_remaining_projects() -> Result<()> {
  let root = TestRoot::new()?;
  let first = root.add_source_repo("first", "v1.0.0")?;
  let second = root.add_source_repo("second", "v1.0.0")?;
  let manifest = format!(
    r#"projects:
  - name: first
    repo: {}
    version: v1.0.0
    releaseCommand: {{name: sh, args: ["-c", "exit 7"]}}
  - name: second
    repo: {}
    version: v1.0.0
    releaseCommand: {{name: "true"}}
"#,
    first.display(),
    second.display()
  );
  root.add_version("v1.19", &manifest)?;

  let output = run_walker_failing(&root.path, &["--clean=false", "--versions", "v1.19"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("failed to run release for project 'first'"), "stderr: {}", stderr);
  assert!(stderr.contains("exited with status 7"), "stderr: {}", stderr);
  assert!(!root.file_exists("second"));
  Ok(())
}

#[test]
fn test_env_does_not_leak_between_projects() -> Result<()> {
  let root = TestRoot::new()?;
  let first = root.add_source_repo("first", "v1.0.0")?;
  let second = root.add_source_repo("second", "v1.0.0")?;
  let manifest = format!(
    r#"projects:
  - name: first
    repo: {}
    version: v1.0.0
    env:
      - {{name: LEAKY, value: from-first}}
    releaseCommand: {{name: sh, args: ["-c", "echo \"leaky=${{LEAKY:-unset}}\" > ../first.txt"]}}
  - name: second
    repo: {}
    version: v1.0.0
    releaseCommand: {{name: sh, args: ["-c", "echo \"leaky=${{LEAKY:-unset}}\" > ../second.txt"]}}
"#,
    first.display(),
    second.display()
  );
  root.add_version("v1.20", &manifest)?;

  run_walker(&root.path, &["--clean=false", "--versions", "v1.20"])?;

  assert_eq!(root.read_file("first.txt")?, "leaky=from-first\n");
  assert_eq!(root.read_file("second.txt")?, "leaky=unset\n");
  Ok(())
}

#[test]
fn test_missing_tag_fails_checkout() -> Result<()> {
  let root = TestRoot::new()?;
  let repo = root.add_source_repo("undistro", "v0.1.0")?;
  root.add_version("v1.19", &manifest_with_release("undistro", &repo, "v9.9.9", "true"))?;

  let output = run_walker_failing(&root.path, &["--clean=false", "--versions", "v1.19"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(stderr.contains("failed to run checkout for project 'undistro'"), "stderr: {}", stderr);
  Ok(())
}
