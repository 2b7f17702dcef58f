pub const APP_NAME: &str = "kiln";

/// Default configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "kiln.toml";

/// Environment variable through which child processes find the toolchain.
pub const LOCATOR_ENV: &str = "LLVM_CONFIG";

/// Base name of the toolchain's control executable.
pub const LOCATOR_NAME: &str = "llvm-config";

/// Build output directory, relative to the source root.
pub const BUILD_DIR_NAME: &str = "build";

/// Directory inside the toolchain source tree that holds the top-level CMake project.
pub const CMAKE_SOURCE_DIR: &str = "llvm";
