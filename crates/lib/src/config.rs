//! Pipeline configuration.
//!
//! A [`PipelineConfig`] is assembled once at startup from built-in defaults,
//! an optional `kiln.toml` file and a few command-line overrides, and is then
//! only ever read. Relative paths in the file resolve against the directory
//! containing the file.
//!
//! ```toml
//! [toolchain]
//! revision = "release/21.x"
//! source_root = "c_pkg/llvm-project"
//! targets = ["X86"]
//! profile = "self-hosting"
//!
//! [project]
//! root = "."
//! entry = "main.go"
//! install_bindings = "always"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use kiln_platform::{PlatformError, expand_path_with_base};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_REPOSITORY: &str = "https://github.com/llvm/llvm-project.git";
pub const DEFAULT_REVISION: &str = "release/21.x";
pub const DEFAULT_SOURCE_ROOT: &str = "c_pkg/llvm-project";
pub const DEFAULT_BINDING: &str = "tinygo.org/x/go-llvm";
pub const DEFAULT_ENTRY: &str = "main.go";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse config file {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: Box<toml::de::Error>,
  },

  #[error("invalid path '{path}': {source}")]
  Path {
    path: String,
    #[source]
    source: PlatformError,
  },

  #[error("cannot derive a build tag from revision '{0}'; set project.build_tag")]
  BuildTag(String),

  #[error("invalid config: {0}")]
  Invalid(String),
}

/// Compiler the toolchain is configured with. Exactly one is active per build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompilerProfile {
  /// Vendor toolchain (MSVC `cl` and `lib.exe`).
  #[default]
  Vendor,
  /// Host clang/lld.
  SelfHosting,
}

impl CompilerProfile {
  /// CMake cache entries selecting the compilers for this profile.
  pub fn cmake_flags(&self) -> &'static [&'static str] {
    match self {
      CompilerProfile::Vendor => &[
        "-DLLVM_AR=lib.exe",
        "-DCMAKE_C_COMPILER=cl",
        "-DCMAKE_CXX_COMPILER=cl",
      ],
      CompilerProfile::SelfHosting => &[
        "-DCMAKE_C_COMPILER=clang",
        "-DCMAKE_CXX_COMPILER=clang++",
        "-DCMAKE_ASM_COMPILER=clang",
        "-DCMAKE_LINKER=lld",
      ],
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      CompilerProfile::Vendor => "vendor",
      CompilerProfile::SelfHosting => "self-hosting",
    }
  }
}

impl FromStr for CompilerProfile {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "vendor" => Ok(CompilerProfile::Vendor),
      "self-hosting" | "self_hosting" => Ok(CompilerProfile::SelfHosting),
      other => Err(ConfigError::Invalid(format!(
        "unknown compiler profile '{other}' (expected vendor or self-hosting)"
      ))),
    }
  }
}

/// When the binding package is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallPolicy {
  /// On every action except `clean`.
  #[default]
  Always,
  /// Never; the project is expected to have its bindings already.
  Never,
}

/// The toolchain source tree and how to build it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
  pub repository: String,
  /// Branch or tag the source tree is pinned to.
  pub revision: String,
  pub source_root: PathBuf,
  pub targets: Vec<String>,
  pub projects: Vec<String>,
  pub runtimes: Vec<String>,
  pub profile: CompilerProfile,
  /// Fixed worker count for the build executor; `None` sizes it from the host.
  pub jobs: Option<usize>,
}

/// The downstream Go project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
  pub root: PathBuf,
  pub entry: String,
  pub binding: String,
  pub build_tag: String,
  pub install: InstallPolicy,
}

/// Names of the external executables kiln drives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tools {
  pub git: String,
  pub cmake: String,
  pub ninja: String,
  pub make: String,
  pub go: String,
}

impl Default for Tools {
  fn default() -> Self {
    Self {
      git: "git".to_string(),
      cmake: "cmake".to_string(),
      ninja: "ninja".to_string(),
      make: "make".to_string(),
      go: "go".to_string(),
    }
  }
}

/// Everything a pipeline run needs to know, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
  pub toolchain: ToolchainConfig,
  pub project: ProjectConfig,
  pub tools: Tools,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
  #[serde(default)]
  toolchain: ToolchainSection,
  #[serde(default)]
  project: ProjectSection,
  #[serde(default)]
  tools: Tools,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ToolchainSection {
  repository: Option<String>,
  revision: Option<String>,
  source_root: Option<String>,
  targets: Option<Vec<String>>,
  projects: Option<Vec<String>>,
  runtimes: Option<Vec<String>>,
  profile: Option<CompilerProfile>,
  jobs: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectSection {
  root: Option<String>,
  entry: Option<String>,
  binding: Option<String>,
  build_tag: Option<String>,
  install_bindings: Option<InstallPolicy>,
}

impl PipelineConfig {
  /// Built-in configuration with relative roots resolved against `base_dir`.
  pub fn defaults(base_dir: &Path) -> Result<Self, ConfigError> {
    Self::from_file(ConfigFile::default(), base_dir)
  }

  /// Load a TOML config file. Relative paths resolve against its directory.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let path = dunce::canonicalize(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
      path: path.clone(),
      source,
    })?;
    debug!(path = %path.display(), "loaded config file");
    Self::parse(&text, &path)
  }

  /// Parse config text as if it had been read from `path`.
  pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source: Box::new(source),
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Self::from_file(file, base_dir)
  }

  fn from_file(file: ConfigFile, base_dir: &Path) -> Result<Self, ConfigError> {
    let ConfigFile {
      toolchain,
      project,
      tools,
    } = file;

    let revision = toolchain.revision.unwrap_or_else(|| DEFAULT_REVISION.to_string());
    let build_tag = match project.build_tag {
      Some(tag) => tag,
      None => derive_build_tag(&revision).ok_or_else(|| ConfigError::BuildTag(revision.clone()))?,
    };

    let config = Self {
      toolchain: ToolchainConfig {
        repository: toolchain
          .repository
          .unwrap_or_else(|| DEFAULT_REPOSITORY.to_string()),
        revision,
        source_root: resolve(
          toolchain.source_root.as_deref().unwrap_or(DEFAULT_SOURCE_ROOT),
          base_dir,
        )?,
        targets: toolchain.targets.unwrap_or_else(|| vec!["X86".to_string()]),
        projects: toolchain.projects.unwrap_or_else(|| {
          ["clang", "lld", "mlir", "clang-tools-extra"]
            .into_iter()
            .map(String::from)
            .collect()
        }),
        runtimes: toolchain
          .runtimes
          .unwrap_or_else(|| vec!["compiler-rt".to_string()]),
        profile: toolchain.profile.unwrap_or_default(),
        jobs: toolchain.jobs,
      },
      project: ProjectConfig {
        root: resolve(project.root.as_deref().unwrap_or("."), base_dir)?,
        entry: project.entry.unwrap_or_else(|| DEFAULT_ENTRY.to_string()),
        binding: project.binding.unwrap_or_else(|| DEFAULT_BINDING.to_string()),
        build_tag,
        install: project.install_bindings.unwrap_or_default(),
      },
      tools,
    };

    config.validate()?;
    Ok(config)
  }

  /// Select the compiler profile.
  pub fn with_profile(mut self, profile: CompilerProfile) -> Self {
    self.toolchain.profile = profile;
    self
  }

  /// Pin the build executor's worker count.
  pub fn with_jobs(mut self, jobs: usize) -> Result<Self, ConfigError> {
    self.toolchain.jobs = Some(jobs);
    self.validate()?;
    Ok(self)
  }

  pub fn with_install_policy(mut self, install: InstallPolicy) -> Self {
    self.project.install = install;
    self
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.toolchain.revision.trim().is_empty() {
      return Err(ConfigError::Invalid("toolchain.revision must not be empty".into()));
    }
    if self.toolchain.targets.is_empty() {
      return Err(ConfigError::Invalid("toolchain.targets must list at least one target".into()));
    }
    if self.toolchain.jobs == Some(0) {
      return Err(ConfigError::Invalid("toolchain.jobs must be at least 1".into()));
    }
    if self.project.entry.trim().is_empty() {
      return Err(ConfigError::Invalid("project.entry must not be empty".into()));
    }
    Ok(())
  }
}

fn resolve(raw: &str, base_dir: &Path) -> Result<PathBuf, ConfigError> {
  expand_path_with_base(raw, base_dir).map_err(|source| ConfigError::Path {
    path: raw.to_string(),
    source,
  })
}

/// Build tag matching the toolchain's major version (`release/21.x` -> `llvm21`).
pub fn derive_build_tag(revision: &str) -> Option<String> {
  let start = revision.find(|c: char| c.is_ascii_digit())?;
  let major: String = revision[start..]
    .chars()
    .take_while(|c| c.is_ascii_digit())
    .collect();
  Some(format!("llvm{major}"))
}
