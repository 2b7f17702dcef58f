//! Source synchronizer.
//!
//! Brings the toolchain source tree to the pinned revision:
//! - Missing tree: a single shallow clone of just that revision
//! - Existing tree: fetch, checkout, pull (checkout first so the pull lands on
//!   the pinned branch)

use tracing::info;

use super::{Stage, StageContext, StageStatus, run_checked};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::exec::{CommandRunner, Invocation};
use crate::paths::PipelinePaths;

pub async fn ensure_source<R: CommandRunner>(
  ctx: &mut StageContext<'_, R>,
) -> Result<StageStatus, PipelineError> {
  let source_root = &ctx.paths.source_root;
  let revision = &ctx.config.toolchain.revision;

  let invocations = if source_root.exists() {
    info!(path = %source_root.display(), revision = %revision, "updating existing source tree");
    update_invocations(ctx.config, ctx.paths)
  } else {
    info!(path = %source_root.display(), revision = %revision, "cloning source tree");
    vec![clone_invocation(ctx.config, ctx.paths)]
  };

  for invocation in &invocations {
    run_checked(&mut *ctx.runner, Stage::Sync, invocation, PipelineError::Sync).await?;
  }

  Ok(StageStatus::Ran)
}

pub fn clone_invocation(config: &PipelineConfig, paths: &PipelinePaths) -> Invocation {
  Invocation::new(&config.tools.git)
    .args(["clone", "--branch"])
    .arg(&config.toolchain.revision)
    .args(["--config", "core.autocrlf=false", "--depth", "1"])
    .arg(&config.toolchain.repository)
    .arg(&paths.source_root)
}

pub fn update_invocations(config: &PipelineConfig, paths: &PipelinePaths) -> Vec<Invocation> {
  let git = |args: &[&str]| {
    Invocation::new(&config.tools.git)
      .args(args.iter().copied())
      .current_dir(&paths.source_root)
  };

  vec![
    git(&["fetch"]),
    git(&["checkout", config.toolchain.revision.as_str()]),
    git(&["pull"]),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exec::recording::RecordingRunner;
  use crate::stages::testutil::{fixture, run_stage};
  use tempfile::TempDir;

  #[tokio::test]
  async fn missing_tree_is_cloned_once() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let mut runner = RecordingRunner::new();

    let status = run_stage(Stage::Sync, &config, &paths, &mut runner).await.unwrap();

    assert_eq!(status, StageStatus::Ran);
    let lines = runner.command_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(
      lines[0],
      format!(
        "git clone --branch release/21.x --config core.autocrlf=false --depth 1 \
         https://github.com/llvm/llvm-project.git {}",
        paths.source_root.display()
      )
    );
  }

  #[tokio::test]
  async fn existing_tree_is_fetched_checked_out_and_pulled() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    std::fs::create_dir_all(&paths.source_root).unwrap();
    let mut runner = RecordingRunner::new();

    run_stage(Stage::Sync, &config, &paths, &mut runner).await.unwrap();

    assert_eq!(
      runner.command_lines(),
      vec!["git fetch", "git checkout release/21.x", "git pull"]
    );
    for invocation in runner.invocations() {
      assert_eq!(invocation.cwd.as_deref(), Some(paths.source_root.as_path()));
    }
  }

  #[tokio::test]
  async fn failed_fetch_stops_the_stage() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    std::fs::create_dir_all(&paths.source_root).unwrap();
    let mut runner = RecordingRunner::new().fail_on("git fetch", Some(128));

    let err = run_stage(Stage::Sync, &config, &paths, &mut runner).await.unwrap_err();

    assert_eq!(runner.command_lines(), vec!["git fetch"]);
    match err {
      PipelineError::Sync(failure) => {
        assert_eq!(failure.argv, vec!["git", "fetch"]);
        assert_eq!(failure.code, Some(128));
      }
      other => panic!("expected sync error, got {other:?}"),
    }
  }

  #[test]
  #[cfg(unix)]
  fn clone_target_keeps_non_unicode_path() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    use std::path::PathBuf;

    let temp = TempDir::new().unwrap();
    let (config, _) = fixture(temp.path());
    let source_root = temp.path().join(OsStr::from_bytes(b"llvm-caf\xe9"));
    let paths = PipelinePaths {
      build_root: source_root.join("build"),
      locator: source_root.join("build/bin/llvm-config"),
      source_root: source_root.clone(),
    };

    let invocation = clone_invocation(&config, &paths);

    assert_eq!(invocation.args.last().map(PathBuf::from), Some(source_root));
  }

  #[test]
  fn custom_git_executable_is_used() {
    let temp = TempDir::new().unwrap();
    let text = "[tools]\ngit = \"/opt/git/bin/git\"\n";
    let config = PipelineConfig::parse(text, &temp.path().join("kiln.toml")).unwrap();
    let paths = PipelinePaths::resolve(&config, kiln_platform::Platform::Linux);

    let invocation = clone_invocation(&config, &paths);
    assert_eq!(invocation.program, "/opt/git/bin/git");
  }
}
