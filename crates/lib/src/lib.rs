//! kiln-lib: staged bring-up of an LLVM toolchain and a dependent Go project
//!
//! This crate provides:
//! - `PipelineConfig`: the immutable description of what to build and where
//! - `PipelinePaths`: source root, build root and `llvm-config` locator derived from it
//! - `CommandRunner`: the single boundary through which external tools are invoked
//! - `Stage`: sync, toolchain, bindings, project build/run and clean steps
//! - `Pipeline`: orders the stages for an `Action` and runs them fail-fast

pub mod action;
pub mod config;
pub mod consts;
pub mod error;
pub mod exec;
pub mod overlay;
pub mod paths;
pub mod pipeline;
pub mod stages;

pub use action::{Action, ActionError};
pub use config::{CompilerProfile, ConfigError, InstallPolicy, PipelineConfig};
pub use error::{CommandFailure, PipelineError};
pub use exec::{CommandRunner, DryRunRunner, Invocation, ProcessRunner};
pub use paths::PipelinePaths;
pub use pipeline::{Pipeline, Progress, Report, State};
pub use stages::{Stage, StageStatus};
