//! Binding installer.

use tracing::info;

use super::{Stage, StageContext, StageStatus, run_checked};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::exec::{CommandRunner, Invocation};
use crate::overlay::{self, Environment};

/// Fetch the pinned binding package into the project.
///
/// Runs under the locator overlay so the fetch can find the toolchain if it
/// compiles native code.
pub async fn install_bindings<R: CommandRunner>(
  ctx: &mut StageContext<'_, R>,
) -> Result<StageStatus, PipelineError> {
  info!(package = %ctx.config.project.binding, "installing bindings");

  let env = overlay::for_locator(&ctx.paths.locator, ctx.platform);
  let invocation = install_invocation(ctx.config, env);
  run_checked(&mut *ctx.runner, Stage::Bindings, &invocation, PipelineError::Install).await?;

  Ok(StageStatus::Ran)
}

pub fn install_invocation(config: &PipelineConfig, env: Environment) -> Invocation {
  Invocation::new(&config.tools.go)
    .args(["get", "-u"])
    .arg(&config.project.binding)
    .current_dir(&config.project.root)
    .env(env)
}
