//! Pipeline orchestration.
//!
//! The orchestrator turns an [`Action`] into an ordered list of stages and
//! runs them one after another:
//!
//! - `clean`: the cleanup stage only
//! - anything else: sync, toolchain, bindings (per install policy), then the
//!   project build and/or run stages the action asks for
//!
//! The first failing stage ends the run; nothing after it is attempted.

use std::path::Path;
use std::time::{Duration, Instant};

use kiln_platform::Platform;
use tracing::{debug, error, info};

use crate::action::Action;
use crate::config::{InstallPolicy, PipelineConfig};
use crate::error::PipelineError;
use crate::exec::CommandRunner;
use crate::paths::PipelinePaths;
use crate::stages::{Stage, StageContext, StageStatus};

/// Where the orchestrator is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  Idle,
  Validating,
  Syncing,
  Building,
  Installing,
  Executing,
  Done,
  Failed,
}

impl State {
  fn for_stage(stage: Stage) -> Self {
    match stage {
      Stage::Sync => State::Syncing,
      Stage::Toolchain => State::Building,
      Stage::Bindings => State::Installing,
      Stage::ProjectBuild | Stage::ProjectRun | Stage::Clean => State::Executing,
    }
  }
}

/// Notifications emitted while a run progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
  StageStarted(Stage),
  StageFinished(Stage, StageStatus),
  /// The toolchain stage finished; this is the locator later stages will see.
  LocatorResolved(&'a Path),
}

/// Timing and outcome of one completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
  pub stage: Stage,
  pub status: StageStatus,
  pub elapsed: Duration,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
  pub action: Action,
  pub stages: Vec<StageReport>,
}

impl Report {
  pub fn total(&self) -> Duration {
    self.stages.iter().map(|s| s.elapsed).sum()
  }
}

/// A configured pipeline bound to one runner.
pub struct Pipeline<R> {
  config: PipelineConfig,
  platform: Platform,
  paths: PipelinePaths,
  runner: R,
  state: State,
}

impl<R: CommandRunner> Pipeline<R> {
  pub fn new(config: PipelineConfig, platform: Platform, runner: R) -> Self {
    let paths = PipelinePaths::resolve(&config, platform);
    Self {
      config,
      platform,
      paths,
      runner,
      state: State::Idle,
    }
  }

  pub fn paths(&self) -> &PipelinePaths {
    &self.paths
  }

  pub fn state(&self) -> State {
    self.state
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// Stages `action` will run, in order.
  pub fn plan(&self, action: Action) -> Vec<Stage> {
    if action == Action::Clean {
      return vec![Stage::Clean];
    }

    let mut stages = vec![Stage::Sync, Stage::Toolchain];
    if self.config.project.install == InstallPolicy::Always {
      stages.push(Stage::Bindings);
    }
    if action.builds_project() {
      stages.push(Stage::ProjectBuild);
    }
    if action.runs_project() {
      stages.push(Stage::ProjectRun);
    }
    stages
  }

  /// Run every planned stage for `action`, stopping at the first failure.
  pub async fn execute<F>(&mut self, action: Action, mut on_progress: F) -> Result<Report, PipelineError>
  where
    F: FnMut(Progress<'_>),
  {
    self.transition(State::Validating);
    let plan = self.plan(action);
    info!(
      action = %action,
      platform = %self.platform,
      stages = ?plan.iter().map(Stage::name).collect::<Vec<_>>(),
      "starting pipeline"
    );

    let mut report = Report {
      action,
      stages: Vec::with_capacity(plan.len()),
    };

    for stage in plan {
      self.transition(State::for_stage(stage));
      on_progress(Progress::StageStarted(stage));

      let started = Instant::now();
      let mut ctx = StageContext {
        config: &self.config,
        paths: &self.paths,
        platform: self.platform,
        runner: &mut self.runner,
      };

      let result = stage.run(&mut ctx).await;
      let status = match result {
        Ok(status) => status,
        Err(err) => {
          error!(stage = %stage, error = %err, "stage failed");
          self.transition(State::Failed);
          return Err(err);
        }
      };

      let elapsed = started.elapsed();
      info!(stage = %stage, ?status, elapsed_ms = elapsed.as_millis() as u64, "stage finished");
      on_progress(Progress::StageFinished(stage, status));
      report.stages.push(StageReport {
        stage,
        status,
        elapsed,
      });

      if stage == Stage::Toolchain {
        on_progress(Progress::LocatorResolved(&self.paths.locator));
      }
    }

    self.transition(State::Done);
    Ok(report)
  }

  fn transition(&mut self, next: State) {
    debug!(from = ?self.state, to = ?next, "pipeline state");
    self.state = next;
  }
}
