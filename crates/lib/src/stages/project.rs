//! Dependent project builder and runner.
//!
//! Both operations run in the project root under a fresh locator overlay and
//! compile with the build tag matching the toolchain's major version.

use tracing::info;

use super::{Stage, StageContext, StageStatus, run_checked};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::exec::{CommandRunner, Invocation};
use crate::overlay::{self, Environment};

/// Tidy the module's dependencies, then compile the entry module.
pub async fn build_project<R: CommandRunner>(
  ctx: &mut StageContext<'_, R>,
) -> Result<StageStatus, PipelineError> {
  info!(entry = %ctx.config.project.entry, tag = %ctx.config.project.build_tag, "building project");

  let env = overlay::for_locator(&ctx.paths.locator, ctx.platform);
  let tidy = go(ctx.config, env.clone()).args(["mod", "tidy"]);
  run_checked(&mut *ctx.runner, Stage::ProjectBuild, &tidy, PipelineError::Build).await?;

  let build = tagged(ctx.config, env, "build");
  run_checked(&mut *ctx.runner, Stage::ProjectBuild, &build, PipelineError::Build).await?;

  Ok(StageStatus::Ran)
}

/// Run the entry module in the foreground with the terminal attached.
pub async fn run_project<R: CommandRunner>(
  ctx: &mut StageContext<'_, R>,
) -> Result<StageStatus, PipelineError> {
  info!(entry = %ctx.config.project.entry, "running project");

  let env = overlay::for_locator(&ctx.paths.locator, ctx.platform);
  let run = tagged(ctx.config, env, "run");
  run_checked(&mut *ctx.runner, Stage::ProjectRun, &run, PipelineError::Run).await?;

  Ok(StageStatus::Ran)
}

fn go(config: &PipelineConfig, env: Environment) -> Invocation {
  Invocation::new(&config.tools.go)
    .current_dir(&config.project.root)
    .env(env)
}

fn tagged(config: &PipelineConfig, env: Environment, subcommand: &str) -> Invocation {
  go(config, env)
    .arg(subcommand)
    .arg(format!("--tags={}", config.project.build_tag))
    .arg(&config.project.entry)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::ffi::OsStr;

  use crate::consts::LOCATOR_ENV;
  use crate::exec::recording::RecordingRunner;
  use crate::stages::testutil::{fixture, run_stage};
  use tempfile::TempDir;

  #[tokio::test]
  async fn build_tidies_then_compiles_with_tag() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let mut runner = RecordingRunner::new();

    run_stage(Stage::ProjectBuild, &config, &paths, &mut runner).await.unwrap();

    assert_eq!(
      runner.command_lines(),
      vec!["go mod tidy", "go build --tags=llvm21 main.go"]
    );
    for invocation in runner.invocations() {
      assert_eq!(invocation.cwd.as_deref(), Some(config.project.root.as_path()));
      let env = invocation.env.as_ref().unwrap();
      assert_eq!(env[OsStr::new(LOCATOR_ENV)].as_os_str(), paths.locator.as_os_str());
    }
  }

  #[tokio::test]
  async fn failed_tidy_skips_compile() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let mut runner = RecordingRunner::new().fail_on("go mod tidy", Some(1));

    let err = run_stage(Stage::ProjectBuild, &config, &paths, &mut runner).await.unwrap_err();

    assert!(matches!(err, PipelineError::Build(_)));
    assert_eq!(runner.command_lines(), vec!["go mod tidy"]);
  }

  #[tokio::test]
  async fn run_uses_same_tag() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let mut runner = RecordingRunner::new();

    run_stage(Stage::ProjectRun, &config, &paths, &mut runner).await.unwrap();

    assert_eq!(runner.command_lines(), vec!["go run --tags=llvm21 main.go"]);
  }

  #[tokio::test]
  async fn run_failure_propagates_exit_code() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let mut runner = RecordingRunner::new().fail_on("go run", Some(3));

    let err = run_stage(Stage::ProjectRun, &config, &paths, &mut runner).await.unwrap_err();

    assert!(matches!(err, PipelineError::Run(_)));
    assert_eq!(err.exit_code(), 3);
  }
}
