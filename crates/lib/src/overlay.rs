//! Child-process environments that expose the toolchain locator.
//!
//! An overlay is a full copy of an environment with [`LOCATOR_ENV`] set. It is
//! built fresh for every invocation that needs it and is never applied to the
//! current process. Names and values are kept as raw OS strings so nothing
//! inherited is lost on the way to the child.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use kiln_platform::Platform;
use tracing::debug;

use crate::consts::LOCATOR_ENV;

/// A complete environment for a child process.
pub type Environment = BTreeMap<OsString, OsString>;

/// Snapshot of the current process environment.
pub fn inherited() -> Environment {
  std::env::vars_os().collect()
}

/// Copy `base` and point [`LOCATOR_ENV`] at `locator`.
///
/// Windows matches variable names case-insensitively, so there any spelling
/// of the locator key is replaced, not just the canonical one.
pub fn overlay(base: &Environment, locator: &Path, platform: Platform) -> Environment {
  let mut env = base.clone();
  if platform.is_windows() {
    env.retain(|key, _| !key.eq_ignore_ascii_case(LOCATOR_ENV));
  }
  debug!(key = LOCATOR_ENV, value = %locator.display(), "overlaying locator");
  env.insert(OsString::from(LOCATOR_ENV), locator.as_os_str().to_os_string());
  env
}

/// Overlay on top of the current process environment.
pub fn for_locator(locator: &Path, platform: Platform) -> Environment {
  overlay(&inherited(), locator, platform)
}
