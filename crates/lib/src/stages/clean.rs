//! Toolchain cleanup.
//!
//! Only the toolchain's own cleanup target runs. The project's build output
//! and installed bindings are left alone.

use tracing::info;

use super::{Stage, StageContext, StageStatus, run_checked};
use crate::error::PipelineError;
use crate::exec::{CommandRunner, Invocation};

pub async fn clean<R: CommandRunner>(ctx: &mut StageContext<'_, R>) -> Result<StageStatus, PipelineError> {
  info!(path = %ctx.paths.source_root.display(), "cleaning toolchain");

  let invocation = Invocation::new(&ctx.config.tools.make)
    .arg("clean")
    .current_dir(&ctx.paths.source_root);
  run_checked(&mut *ctx.runner, Stage::Clean, &invocation, PipelineError::Clean).await?;

  Ok(StageStatus::Ran)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exec::recording::RecordingRunner;
  use crate::stages::testutil::{fixture, run_stage};
  use tempfile::TempDir;

  #[tokio::test]
  async fn invokes_cleanup_target_in_source_root() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let mut runner = RecordingRunner::new();

    run_stage(Stage::Clean, &config, &paths, &mut runner).await.unwrap();

    let invocations = runner.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].to_string(), "make clean");
    assert_eq!(invocations[0].cwd.as_deref(), Some(paths.source_root.as_path()));
    assert!(invocations[0].env.is_none());
  }

  #[tokio::test]
  async fn failure_is_clean_error() {
    let temp = TempDir::new().unwrap();
    let (config, paths) = fixture(temp.path());
    let mut runner = RecordingRunner::new().fail_on("make", Some(2));

    let err = run_stage(Stage::Clean, &config, &paths, &mut runner).await.unwrap_err();

    assert!(matches!(err, PipelineError::Clean(_)));
    assert_eq!(err.exit_code(), 2);
  }
}
