//! Tool configuration assembled from `.env`, the environment, and flags.

use std::env;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::ToolError;
use crate::loader::archive::is_archive_path;
use crate::ports::filesystem::FileSystem;

/// Environment variable naming a directory or archive of platform classes.
pub const PLATFORM_ROOT_VAR: &str = "APISURFACE_PLATFORM_ROOT";

/// Environment variable naming the JDK used when no platform root is set.
pub const JAVA_HOME_VAR: &str = "JAVA_HOME";

/// Settings shared by both tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolConfig {
    /// Directory or archive consulted for classes the artifact root does not
    /// define.
    pub platform_root: Option<PathBuf>,
    /// JDK whose `jmods` or `rt.jar` supply platform classes when
    /// `platform_root` is unset.
    pub java_home: Option<PathBuf>,
}

impl ToolConfig {
    /// Loads `.env` from the working directory, then reads the environment.
    ///
    /// A `--platform-root` flag, when given, wins over both.
    #[must_use]
    pub fn load(flag_platform_root: Option<PathBuf>) -> Self {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                warn!(error = %err, "ignoring unreadable .env file");
            }
        }
        Self::from_sources(
            flag_platform_root,
            path_var(PLATFORM_ROOT_VAR),
            path_var(JAVA_HOME_VAR),
        )
    }

    /// Merges settings by precedence: flag, then environment.
    #[must_use]
    pub fn from_sources(
        flag: Option<PathBuf>,
        from_env: Option<PathBuf>,
        java_home: Option<PathBuf>,
    ) -> Self {
        let platform_root = flag.or(from_env);
        debug!(platform_root = ?platform_root, java_home = ?java_home, "resolved configuration");
        Self { platform_root, java_home }
    }

    /// Checks the configured paths against `fs`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Configuration`] if the platform root is neither a
    /// directory nor an existing class archive.
    pub fn validate(&self, fs: &dyn FileSystem) -> Result<(), ToolError> {
        match &self.platform_root {
            Some(path)
                if !fs.is_dir(path)
                    && !(is_archive_path(path) && fs.canonicalize(path).is_ok()) =>
            {
                Err(ToolError::Configuration(format!(
                    "platform root {} is not a directory or class archive",
                    path.display()
                )))
            }
            _ => Ok(()),
        }
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    env::var_os(name).filter(|value| !value.is_empty()).map(PathBuf::from)
}
