//! The boundary between the pipeline and external tools.
//!
//! Stages never spawn processes or create directories themselves; they
//! describe an [`Invocation`] and hand it to a [`CommandRunner`]. The real
//! runner spawns the process, the dry-run runner only echoes it, and tests
//! record it.

mod dry_run;
mod process;
#[cfg(test)]
pub(crate) mod recording;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::overlay::Environment;

pub use dry_run::DryRunRunner;
pub use process::ProcessRunner;

/// Errors raised by a runner before an external command could report a status.
#[derive(Debug, Error)]
pub enum ExecError {
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// One external command: program, arguments, working directory and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<OsString>,
  /// Working directory; `None` keeps the current one.
  pub cwd: Option<PathBuf>,
  /// Complete environment for the child; `None` inherits the parent's.
  pub env: Option<Environment>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      env: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn env(mut self, env: Environment) -> Self {
    self.env = Some(env);
    self
  }

  /// Program followed by its arguments, lossily rendered for display.
  pub fn argv(&self) -> Vec<String> {
    std::iter::once(self.program.clone())
      .chain(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()))
      .collect()
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg.to_string_lossy())?;
    }
    Ok(())
  }
}

/// How an external command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
  /// Exit code; `None` when the process was terminated by a signal.
  pub code: Option<i32>,
}

impl Outcome {
  pub const SUCCESS: Outcome = Outcome { code: Some(0) };

  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Executes invocations on behalf of the pipeline.
///
/// Every call blocks the pipeline until the command has finished; runners
/// must not start anything concurrently.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
  /// Run one command to completion.
  ///
  /// A non-zero exit is reported through [`Outcome`], not as an error.
  async fn run(&mut self, invocation: &Invocation) -> Result<Outcome, ExecError>;

  /// Create a directory and its parents.
  async fn create_dir_all(&mut self, path: &Path) -> Result<(), ExecError>;
}
