//! Pipeline failures.
//!
//! Every stage failure is fatal. The error carries the failing command so the
//! caller can report it and exit with the same status.

use std::fmt;

use thiserror::Error;

use crate::exec::{ExecError, Invocation};
use crate::stages::Stage;

/// An external command that finished unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
  pub argv: Vec<String>,
  /// Exit code; `None` when the process was terminated by a signal.
  pub code: Option<i32>,
}

impl CommandFailure {
  pub fn new(invocation: &Invocation, code: Option<i32>) -> Self {
    Self {
      argv: invocation.argv(),
      code,
    }
  }
}

impl fmt::Display for CommandFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.code {
      Some(code) => write!(f, "`{}` exited with status {}", self.argv.join(" "), code),
      None => write!(f, "`{}` was terminated by a signal", self.argv.join(" ")),
    }
  }
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
  /// Cloning or updating the toolchain source failed.
  #[error("source sync failed: {0}")]
  Sync(CommandFailure),

  /// Configuring or compiling the toolchain, or compiling the project, failed.
  #[error("build failed: {0}")]
  Build(CommandFailure),

  /// Fetching the binding package failed.
  #[error("binding install failed: {0}")]
  Install(CommandFailure),

  /// Running the project failed.
  #[error("run failed: {0}")]
  Run(CommandFailure),

  /// The toolchain's cleanup target failed.
  #[error("clean failed: {0}")]
  Clean(CommandFailure),

  /// A command could not be started at all.
  #[error("{stage} stage could not proceed: {source}")]
  Exec {
    stage: Stage,
    #[source]
    source: ExecError,
  },
}

impl PipelineError {
  /// The failing command, if one ran.
  pub fn failure(&self) -> Option<&CommandFailure> {
    match self {
      PipelineError::Sync(failure)
      | PipelineError::Build(failure)
      | PipelineError::Install(failure)
      | PipelineError::Run(failure)
      | PipelineError::Clean(failure) => Some(failure),
      PipelineError::Exec { .. } => None,
    }
  }

  /// Process exit status to report: the failing command's own code when it
  /// has a non-zero one, otherwise 1.
  pub fn exit_code(&self) -> i32 {
    match self.failure().and_then(|failure| failure.code) {
      Some(code) if code != 0 => code,
      _ => 1,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn failure(code: Option<i32>) -> CommandFailure {
    CommandFailure::new(&Invocation::new("ninja").args(["-C", "build", "-j7"]), code)
  }

  #[test]
  fn exit_code_propagates_command_status() {
    assert_eq!(PipelineError::Build(failure(Some(2))).exit_code(), 2);
    assert_eq!(PipelineError::Run(failure(Some(130))).exit_code(), 130);
  }

  #[test]
  fn exit_code_falls_back_to_one() {
    assert_eq!(PipelineError::Build(failure(None)).exit_code(), 1);

    let spawn = PipelineError::Exec {
      stage: Stage::Sync,
      source: ExecError::Spawn {
        program: "git".to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
      },
    };
    assert_eq!(spawn.exit_code(), 1);
    assert!(spawn.failure().is_none());
  }

  #[test]
  fn message_names_stage_and_command() {
    let err = PipelineError::Build(failure(Some(1)));
    assert_eq!(
      err.to_string(),
      "build failed: `ninja -C build -j7` exited with status 1"
    );
  }
}
