//! Filesystem locations derived from the configuration.

use std::path::PathBuf;

use kiln_platform::Platform;

use crate::config::PipelineConfig;
use crate::consts::{BUILD_DIR_NAME, LOCATOR_NAME};

/// Fixed layout of the toolchain tree.
///
/// ```text
/// <source_root>/                       version-controlled toolchain source
/// <source_root>/build/                 generated build tree
/// <source_root>/build/bin/llvm-config  locator, and the "already built" marker
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
  pub source_root: PathBuf,
  pub build_root: PathBuf,
  pub locator: PathBuf,
}

impl PipelinePaths {
  /// Derive all locations. Pure: nothing is read from or written to disk.
  pub fn resolve(config: &PipelineConfig, platform: Platform) -> Self {
    let source_root = config.toolchain.source_root.clone();
    let build_root = source_root.join(BUILD_DIR_NAME);
    let locator = build_root.join("bin").join(platform.executable(LOCATOR_NAME));
    Self {
      source_root,
      build_root,
      locator,
    }
  }
}
