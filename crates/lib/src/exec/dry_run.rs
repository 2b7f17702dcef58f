//! Runner that only prints what would be executed.

use std::path::Path;

use tracing::info;

use super::{CommandRunner, ExecError, Invocation, Outcome};

/// Echoes invocations and directory creation, executes nothing, always succeeds.
#[derive(Debug, Default)]
pub struct DryRunRunner;

impl DryRunRunner {
  pub fn new() -> Self {
    Self
  }
}

impl CommandRunner for DryRunRunner {
  async fn run(&mut self, invocation: &Invocation) -> Result<Outcome, ExecError> {
    println!("> {}", invocation);
    if let Some(dir) = &invocation.cwd {
      info!(cwd = %dir.display(), "dry run, not executing");
    }
    Ok(Outcome::SUCCESS)
  }

  async fn create_dir_all(&mut self, path: &Path) -> Result<(), ExecError> {
    println!("> mkdir {}", path.display());
    Ok(())
  }
}
