//! Toolchain builder.
//!
//! Toolchain builds take hours, so the existence of the locator binary is
//! treated as proof that the build is done: if it is present, neither CMake
//! nor Ninja is invoked. A failed build leaves its partial tree in place and
//! the next run starts over from the configure step.

use tracing::{info, warn};

use super::{Stage, StageContext, StageStatus, run_checked};
use crate::config::{CompilerProfile, PipelineConfig};
use crate::consts::{BUILD_DIR_NAME, CMAKE_SOURCE_DIR};
use crate::error::PipelineError;
use crate::exec::{CommandRunner, Invocation};
use crate::paths::PipelinePaths;

pub async fn ensure_build<R: CommandRunner>(
  ctx: &mut StageContext<'_, R>,
) -> Result<StageStatus, PipelineError> {
  let paths = ctx.paths;

  if paths.locator.exists() {
    info!(locator = %paths.locator.display(), "toolchain already built, skipping rebuild");
    return Ok(StageStatus::Skipped);
  }

  let profile = ctx.config.toolchain.profile;
  if profile == CompilerProfile::Vendor && !ctx.platform.is_windows() {
    warn!(
      platform = %ctx.platform,
      "vendor compiler profile expects MSVC; consider the self-hosting profile on this host"
    );
  }

  if !paths.build_root.exists() {
    ctx
      .runner
      .create_dir_all(&paths.build_root)
      .await
      .map_err(|source| PipelineError::Exec {
        stage: Stage::Toolchain,
        source,
      })?;
  }

  let jobs = worker_count(ctx.config);
  info!(profile = profile.as_str(), jobs, "configuring and building toolchain");

  let generator = generator_invocation(ctx.config, paths);
  run_checked(&mut *ctx.runner, Stage::Toolchain, &generator, PipelineError::Build).await?;

  let executor = executor_invocation(paths, jobs, &ctx.config.tools.ninja);
  run_checked(&mut *ctx.runner, Stage::Toolchain, &executor, PipelineError::Build).await?;

  Ok(StageStatus::Ran)
}

/// CMake configure step for a release build of the enabled sub-projects.
pub fn generator_invocation(config: &PipelineConfig, paths: &PipelinePaths) -> Invocation {
  let toolchain = &config.toolchain;

  Invocation::new(&config.tools.cmake)
    .args(["-S", CMAKE_SOURCE_DIR, "-B", BUILD_DIR_NAME, "-G", "Ninja"])
    .arg("-DCMAKE_BUILD_TYPE=Release")
    .arg(format!("-DLLVM_ENABLE_PROJECTS={}", toolchain.projects.join(";")))
    .arg(format!("-DLLVM_ENABLE_RUNTIMES={}", toolchain.runtimes.join(";")))
    .arg(format!("-DLLVM_TARGETS_TO_BUILD={}", toolchain.targets.join(";")))
    .args(toolchain.profile.cmake_flags().iter().copied())
    .current_dir(&paths.source_root)
}

/// Ninja over the generated build tree.
pub fn executor_invocation(paths: &PipelinePaths, jobs: usize, ninja: &str) -> Invocation {
  Invocation::new(ninja)
    .args(["-C", BUILD_DIR_NAME])
    .arg(format!("-j{jobs}"))
    .current_dir(&paths.source_root)
}

/// Configured job count, or all processors but one.
pub fn worker_count(config: &PipelineConfig) -> usize {
  config.toolchain.jobs.unwrap_or_else(|| {
    let available = std::thread::available_parallelism()
      .map(|n| n.get())
      .unwrap_or(1);
    workers_for(available)
  })
}

fn workers_for(available: usize) -> usize {
  available.saturating_sub(1).max(1)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exec::recording::{Event, RecordingRunner};
  use crate::stages::testutil::{fixture, run_stage};
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn touch_locator(paths: &PipelinePaths) {
    let bin = paths.locator.parent().unwrap();
    std::fs::create_dir_all(bin).unwrap();
    std::fs::write(&paths.locator, b"").unwrap();
  }

  #[tokio::test]
  #[traced_test]
  async fn existing_locator_skips_everything() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    touch_locator(&paths);
    let mut runner = RecordingRunner::new();

    let status = run_stage(Stage::Toolchain, &config, &paths, &mut runner).await.unwrap();

    assert_eq!(status, StageStatus::Skipped);
    assert!(runner.events.is_empty());
    assert!(logs_contain("toolchain already built"));
  }

  #[tokio::test]
  async fn missing_locator_creates_build_root_then_configures_then_builds() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let config = config.with_jobs(7).unwrap();
    let mut runner = RecordingRunner::new();

    let status = run_stage(Stage::Toolchain, &config, &paths, &mut runner).await.unwrap();

    assert_eq!(status, StageStatus::Ran);
    assert_eq!(runner.events.len(), 3);
    assert_eq!(runner.events[0], Event::CreateDir(paths.build_root.clone()));

    let invocations = runner.invocations();
    assert_eq!(invocations[0].program, "cmake");
    assert_eq!(invocations[1].to_string(), "ninja -C build -j7");
    for invocation in invocations {
      assert_eq!(invocation.cwd.as_deref(), Some(paths.source_root.as_path()));
    }
  }

  #[tokio::test]
  async fn existing_build_root_is_not_recreated() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    std::fs::create_dir_all(&paths.build_root).unwrap();
    let mut runner = RecordingRunner::new();

    run_stage(Stage::Toolchain, &config, &paths, &mut runner).await.unwrap();

    assert!(!runner.events.iter().any(|e| matches!(e, Event::CreateDir(_))));
    assert_eq!(runner.invocations().len(), 2);
  }

  #[tokio::test]
  async fn generator_failure_skips_executor() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let mut runner = RecordingRunner::new().fail_on("cmake", Some(1));

    let err = run_stage(Stage::Toolchain, &config, &paths, &mut runner).await.unwrap_err();

    assert!(matches!(err, PipelineError::Build(ref f) if f.argv[0] == "cmake"));
    assert_eq!(runner.invocations().len(), 1);
  }

  #[tokio::test]
  async fn executor_failure_is_build_error() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let mut runner = RecordingRunner::new().fail_on("ninja", Some(2));

    let err = run_stage(Stage::Toolchain, &config, &paths, &mut runner).await.unwrap_err();

    assert_eq!(err.exit_code(), 2);
    assert!(matches!(err, PipelineError::Build(_)));
  }

  #[test]
  fn vendor_profile_generator_arguments() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());

    let invocation = generator_invocation(&config, &paths);

    assert_eq!(
      invocation.argv()[1..],
      [
        "-S",
        "llvm",
        "-B",
        "build",
        "-G",
        "Ninja",
        "-DCMAKE_BUILD_TYPE=Release",
        "-DLLVM_ENABLE_PROJECTS=clang;lld;mlir;clang-tools-extra",
        "-DLLVM_ENABLE_RUNTIMES=compiler-rt",
        "-DLLVM_TARGETS_TO_BUILD=X86",
        "-DLLVM_AR=lib.exe",
        "-DCMAKE_C_COMPILER=cl",
        "-DCMAKE_CXX_COMPILER=cl",
      ]
    );
  }

  #[test]
  fn self_hosting_profile_replaces_vendor_flags() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let config = config.with_profile(CompilerProfile::SelfHosting);

    let args = generator_invocation(&config, &paths).argv();

    assert!(args.contains(&"-DCMAKE_CXX_COMPILER=clang++".to_string()));
    assert!(args.contains(&"-DCMAKE_LINKER=lld".to_string()));
    assert!(!args.iter().any(|a| a.ends_with("=cl") || a.contains("lib.exe")));
  }

  #[test]
  fn one_core_is_left_for_the_host() {
    assert_eq!(workers_for(16), 15);
    assert_eq!(workers_for(2), 1);
    assert_eq!(workers_for(1), 1);
  }
}
