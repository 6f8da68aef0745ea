//! Service context bundling the port trait objects.

use std::path::Path;

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::config::ToolConfig;
use crate::error::ToolError;
use crate::loader::ClassLoader;
use crate::ports::filesystem::FileSystem;

/// Bundles the external boundaries a command needs.
pub struct ServiceContext {
    /// Filesystem holding the artifact and platform roots.
    pub fs: Box<dyn FileSystem>,
}

impl ServiceContext {
    /// Creates a context backed by the real filesystem.
    #[must_use]
    pub fn live() -> Self {
        Self { fs: Box::new(LiveFileSystem) }
    }

    /// Creates a context around an arbitrary filesystem adapter.
    #[must_use]
    pub fn with_fs(fs: Box<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Validates `config` and opens a loader over `root`.
    ///
    /// Without a platform root, the JDK at `config.java_home` supplies
    /// platform classes.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Configuration`] if either root is unusable.
    pub fn open_loader(
        &self,
        root: &Path,
        config: &ToolConfig,
    ) -> Result<ClassLoader<'_>, ToolError> {
        config.validate(self.fs.as_ref())?;
        let loader = ClassLoader::open(self.fs.as_ref(), root, config.platform_root.as_deref())?;
        Ok(match (&config.platform_root, &config.java_home) {
            (None, Some(java_home)) => loader.with_java_home(java_home),
            _ => loader,
        })
    }
}
