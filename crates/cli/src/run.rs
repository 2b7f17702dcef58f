//! Implementation of the pipeline command.
//!
//! Assembles the configuration, picks a runner and drives the pipeline for
//! the requested action on a single-threaded runtime.

use std::path::PathBuf;

use anyhow::{Context, Result};
use kiln_lib::consts::CONFIG_FILE_NAME;
use kiln_lib::{
  Action, CommandRunner, CompilerProfile, DryRunRunner, InstallPolicy, Pipeline, PipelineConfig,
  PipelineError, ProcessRunner, Report,
};
use kiln_platform::Platform;
use tracing::{debug, info};

use crate::output;

/// Command-line overrides on top of the configuration file.
pub struct Options {
  pub config: Option<PathBuf>,
  pub profile: Option<CompilerProfile>,
  pub jobs: Option<usize>,
  pub skip_bindings: bool,
  pub dry_run: bool,
}

pub fn load_config(options: &Options) -> Result<PipelineConfig> {
  let mut config = match &options.config {
    Some(path) => PipelineConfig::load(path)
      .with_context(|| format!("Failed to load config {}", path.display()))?,
    None => {
      let cwd = std::env::current_dir().context("Failed to determine working directory")?;
      let default = cwd.join(CONFIG_FILE_NAME);
      if default.is_file() {
        PipelineConfig::load(&default)
          .with_context(|| format!("Failed to load config {}", default.display()))?
      } else {
        debug!(dir = %cwd.display(), "no config file, using defaults");
        PipelineConfig::defaults(&cwd).context("Invalid default configuration")?
      }
    }
  };

  if let Some(profile) = options.profile {
    config = config.with_profile(profile);
  }
  if let Some(jobs) = options.jobs {
    config = config.with_jobs(jobs).context("Invalid --jobs")?;
  }
  if options.skip_bindings {
    config = config.with_install_policy(InstallPolicy::Never);
  }

  Ok(config)
}

/// Run `action` end to end and print a summary on success.
pub fn cmd_run(action: Action, options: &Options) -> Result<()> {
  let config = load_config(options)?;
  let platform = Platform::current();
  info!(action = %action, platform = %platform, dry_run = options.dry_run, "resolved run");

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;

  let report = if options.dry_run {
    rt.block_on(execute(Pipeline::new(config, platform, DryRunRunner::new()), action))?
  } else {
    rt.block_on(execute(Pipeline::new(config, platform, ProcessRunner::new()), action))?
  };

  output::print_report(&report);
  Ok(())
}

async fn execute<R: CommandRunner>(mut pipeline: Pipeline<R>, action: Action) -> Result<Report, PipelineError> {
  pipeline.execute(action, output::print_progress).await
}
