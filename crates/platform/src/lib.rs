//! Platform detection and path helpers for kiln
//!
//! This crate provides:
//! - Host platform detection and executable naming
//! - Expansion of configured roots (`~`, relative to a base directory)

mod error;
mod paths;
mod platform;

pub use error::PlatformError;
pub use paths::{expand_path, expand_path_with_base};
pub use platform::Platform;
