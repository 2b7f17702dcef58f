//! Path expansion for configured roots

use crate::error::PlatformError;
use std::path::{Component, Path, PathBuf};

/// Expand a path, resolving a leading `~` to the user's home directory
pub fn expand_path<P: AsRef<Path>>(path: P) -> Result<PathBuf, PlatformError> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or(PlatformError::NoHomeDirectory)?;
        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir().ok_or(PlatformError::NoHomeDirectory)
    } else {
        Ok(path.to_path_buf())
    }
}

/// Expand a path relative to a base directory
///
/// - `~` is expanded to the home directory
/// - Relative paths are joined onto `base` and normalized
/// - Absolute paths are returned as-is
///
/// ```
/// use kiln_platform::expand_path_with_base;
/// use std::path::PathBuf;
///
/// let path = expand_path_with_base("c_pkg/../c_pkg/llvm-project", "/work/repo").unwrap();
/// assert_eq!(path, PathBuf::from("/work/repo/c_pkg/llvm-project"));
/// ```
pub fn expand_path_with_base<P: AsRef<Path>, B: AsRef<Path>>(
    path: P,
    base: B,
) -> Result<PathBuf, PlatformError> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if path_str.is_empty() {
        return Err(PlatformError::InvalidPath("empty path".to_string()));
    }

    if path_str.starts_with('~') {
        return expand_path(path);
    }

    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    // Windows: drive-relative paths such as `C:foo`
    #[cfg(windows)]
    if path_str.len() >= 2 && path_str.chars().nth(1) == Some(':') {
        return Ok(path.to_path_buf());
    }

    Ok(normalize_path(&base.as_ref().join(path)))
}

/// Resolve `.` and `..` components without touching the filesystem
fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                } else if components.is_empty() {
                    components.push(component);
                }
            }
            Component::CurDir => {}
            other => components.push(other),
        }
    }

    if components.is_empty() {
        return PathBuf::from(".");
    }

    components.iter().collect()
}
