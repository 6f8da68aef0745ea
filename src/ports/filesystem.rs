//! Filesystem port for reading artifact roots.

use std::path::{Path, PathBuf};

/// Provides read-only access to directories of compiled artifacts.
///
/// Abstracting the filesystem lets the loader run against an in-memory tree
/// in tests without touching the real disk.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    fn read_bytes(
        &self,
        path: &Path,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns `true` if the path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Lists the entry names of a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(
        &self,
        path: &Path,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Resolves symbolic links and returns the absolute path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist.
    fn canonicalize(
        &self,
        path: &Path,
    ) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>>;
}
