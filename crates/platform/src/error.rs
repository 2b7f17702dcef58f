//! Error types for kiln-platform

use thiserror::Error;

/// Errors that can occur while resolving platform paths
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Failed to determine home directory")]
    NoHomeDirectory,

    #[error("Path error: {0}")]
    InvalidPath(String),
}
