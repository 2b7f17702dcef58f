//! Test double that records what the pipeline asked for.

use std::path::{Path, PathBuf};

use super::{CommandRunner, ExecError, Invocation, Outcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
  Command(Invocation),
  CreateDir(PathBuf),
}

/// Records every request; commands succeed unless scripted to fail.
#[derive(Debug, Default)]
pub struct RecordingRunner {
  pub events: Vec<Event>,
  failures: Vec<(String, Option<i32>)>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fail any command whose rendered command line starts with `prefix`.
  pub fn fail_on(mut self, prefix: &str, code: Option<i32>) -> Self {
    self.failures.push((prefix.to_string(), code));
    self
  }

  pub fn invocations(&self) -> Vec<&Invocation> {
    self
      .events
      .iter()
      .filter_map(|event| match event {
        Event::Command(invocation) => Some(invocation),
        Event::CreateDir(_) => None,
      })
      .collect()
  }

  /// Rendered command lines, in issue order.
  pub fn command_lines(&self) -> Vec<String> {
    self.invocations().iter().map(|inv| inv.to_string()).collect()
  }
}

impl CommandRunner for RecordingRunner {
  async fn run(&mut self, invocation: &Invocation) -> Result<Outcome, ExecError> {
    self.events.push(Event::Command(invocation.clone()));
    let line = invocation.to_string();
    let outcome = self
      .failures
      .iter()
      .find(|(prefix, _)| line.starts_with(prefix.as_str()))
      .map(|(_, code)| Outcome { code: *code })
      .unwrap_or(Outcome::SUCCESS);
    Ok(outcome)
  }

  async fn create_dir_all(&mut self, path: &Path) -> Result<(), ExecError> {
    self.events.push(Event::CreateDir(path.to_path_buf()));
    Ok(())
  }
}
