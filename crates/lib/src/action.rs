//! The action vocabulary accepted on the command line.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// What the user asked the pipeline to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
  /// Prepare the toolchain and compile the project.
  Build,
  /// Prepare the toolchain and run the project.
  Run,
  /// Build, then run.
  #[default]
  All,
  /// Invoke the toolchain's cleanup target and nothing else.
  Clean,
}

/// An action argument outside the supported vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported action '{0}' (expected one of: build, run, all, clean)")]
pub struct ActionError(pub String);

impl Action {
  pub const VARIANTS: [Action; 4] = [Action::Build, Action::Run, Action::All, Action::Clean];

  /// Resolve the optional positional argument; absent means [`Action::All`].
  pub fn parse(arg: Option<&str>) -> Result<Self, ActionError> {
    match arg {
      None => Ok(Action::default()),
      Some(raw) => raw.parse(),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Action::Build => "build",
      Action::Run => "run",
      Action::All => "all",
      Action::Clean => "clean",
    }
  }

  /// Whether the downstream project gets compiled.
  pub fn builds_project(&self) -> bool {
    matches!(self, Action::Build | Action::All)
  }

  /// Whether the downstream project gets executed.
  pub fn runs_project(&self) -> bool {
    matches!(self, Action::Run | Action::All)
  }
}

impl FromStr for Action {
  type Err = ActionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "build" => Ok(Action::Build),
      "run" => Ok(Action::Run),
      "all" => Ok(Action::All),
      "clean" => Ok(Action::Clean),
      _ => Err(ActionError(s.to_string())),
    }
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
