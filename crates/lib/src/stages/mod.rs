//! Pipeline stages.
//!
//! Each stage is an independently failable step sharing one contract:
//! given the run's configuration, derived paths, platform and runner, issue
//! zero or more invocations and report whether work was done.

pub mod bindings;
pub mod clean;
pub mod project;
pub mod sync;
pub mod toolchain;

use std::fmt;

use kiln_platform::Platform;

use crate::config::PipelineConfig;
use crate::error::{CommandFailure, PipelineError};
use crate::exec::{CommandRunner, Invocation};
use crate::paths::PipelinePaths;

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  /// Run the toolchain's cleanup target.
  Clean,
  /// Clone or update the toolchain source tree.
  Sync,
  /// Configure and compile the toolchain unless already built.
  Toolchain,
  /// Fetch the binding package.
  Bindings,
  /// Resolve dependencies and compile the project.
  ProjectBuild,
  /// Run the project.
  ProjectRun,
}

/// Whether a stage did any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
  Ran,
  /// Nothing to do, e.g. the toolchain was already built.
  Skipped,
}

/// Read-only run state plus the runner, handed to each stage.
pub struct StageContext<'a, R> {
  pub config: &'a PipelineConfig,
  pub paths: &'a PipelinePaths,
  pub platform: Platform,
  pub runner: &'a mut R,
}

impl Stage {
  pub fn name(&self) -> &'static str {
    match self {
      Stage::Clean => "clean",
      Stage::Sync => "sync",
      Stage::Toolchain => "toolchain",
      Stage::Bindings => "bindings",
      Stage::ProjectBuild => "project-build",
      Stage::ProjectRun => "project-run",
    }
  }

  /// Short human-readable description printed when the stage starts.
  pub fn banner(&self) -> &'static str {
    match self {
      Stage::Clean => "Cleaning toolchain build",
      Stage::Sync => "Syncing toolchain source",
      Stage::Toolchain => "Building toolchain",
      Stage::Bindings => "Installing bindings",
      Stage::ProjectBuild => "Building project",
      Stage::ProjectRun => "Running project",
    }
  }

  pub async fn run<R: CommandRunner>(
    self,
    ctx: &mut StageContext<'_, R>,
  ) -> Result<StageStatus, PipelineError> {
    match self {
      Stage::Clean => clean::clean(ctx).await,
      Stage::Sync => sync::ensure_source(ctx).await,
      Stage::Toolchain => toolchain::ensure_build(ctx).await,
      Stage::Bindings => bindings::install_bindings(ctx).await,
      Stage::ProjectBuild => project::build_project(ctx).await,
      Stage::ProjectRun => project::run_project(ctx).await,
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// Run `invocation` and turn a non-zero exit into the stage's error kind.
async fn run_checked<R: CommandRunner>(
  runner: &mut R,
  stage: Stage,
  invocation: &Invocation,
  wrap: fn(CommandFailure) -> PipelineError,
) -> Result<(), PipelineError> {
  let outcome = runner
    .run(invocation)
    .await
    .map_err(|source| PipelineError::Exec { stage, source })?;

  if outcome.success() {
    Ok(())
  } else {
    Err(wrap(CommandFailure::new(invocation, outcome.code)))
  }
}
