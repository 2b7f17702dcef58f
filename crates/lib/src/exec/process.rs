//! Runner that spawns real processes.

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, warn};

use super::{CommandRunner, ExecError, Invocation, Outcome};

/// Spawns each invocation with inherited stdio and waits for it.
///
/// The command line is echoed to stdout before the process starts, so the
/// external tool's own output follows the line that caused it.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
  pub fn new() -> Self {
    Self
  }
}

impl CommandRunner for ProcessRunner {
  async fn run(&mut self, invocation: &Invocation) -> Result<Outcome, ExecError> {
    println!("> {}", invocation);

    let mut command = Command::new(&invocation.program);
    command.args(&invocation.args);

    if let Some(dir) = &invocation.cwd {
      command.current_dir(dir);
    }

    if let Some(env) = &invocation.env {
      command.env_clear().envs(env);
    }

    debug!(
      program = %invocation.program,
      cwd = ?invocation.cwd,
      env_vars = invocation.env.as_ref().map(|env| env.len()),
      "spawning process"
    );

    let status = command.status().await.map_err(|source| ExecError::Spawn {
      program: invocation.program.clone(),
      source,
    })?;

    if !status.success() {
      warn!(command = %invocation, code = ?status.code(), "command failed");
    }

    Ok(Outcome { code: status.code() })
  }

  async fn create_dir_all(&mut self, path: &Path) -> Result<(), ExecError> {
    debug!(path = %path.display(), "creating directory");
    tokio::fs::create_dir_all(path)
      .await
      .map_err(|source| ExecError::CreateDir {
        path: path.to_path_buf(),
        source,
      })
  }
}
