//! Host platform detection

use std::fmt;

use tracing::debug;

/// Host platform tag
///
/// Only three conventions matter to kiln: macOS, Windows and everything else,
/// which is treated as Linux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Mac,
    Windows,
    Linux,
}

impl Platform {
    /// Detect the platform of the running process
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map an OS name (as reported by `std::env::consts::OS`) to a platform
    ///
    /// Never fails: unknown names fall back to [`Platform::Linux`].
    pub fn from_os_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "macos" | "darwin" => Platform::Mac,
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            other => {
                debug!(os = other, "unrecognised OS, assuming linux conventions");
                Platform::Linux
            }
        }
    }

    /// Returns the platform tag
    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::Mac => "mac",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
        }
    }

    /// Suffix appended to executable file names
    pub const fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Mac | Platform::Linux => "",
        }
    }

    /// File name of an executable called `name` on this platform
    pub fn executable(&self, name: &str) -> String {
        format!("{}{}", name, self.exe_suffix())
    }

    pub fn is_windows(&self) -> bool {
        *self == Platform::Windows
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
