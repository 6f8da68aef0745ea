//! Class files packed in zip archives: jars and JDK `.jmod` files.

use std::cell::RefCell;
use std::error::Error;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use super::LoadError;
use crate::ports::filesystem::FileSystem;

/// Header that precedes the zip data of a `.jmod` file.
pub const JMOD_MAGIC: &[u8] = b"JM\x01\x00";

/// Directory holding class files inside a `.jmod`.
const JMOD_CLASSES: &str = "classes/";

/// Returns `true` if `path` names a file this module can index.
#[must_use]
pub fn is_archive_path(path: &Path) -> bool {
    matches!(path.extension().and_then(|ext| ext.to_str()), Some("jar" | "zip" | "jmod"))
}

/// An opened archive, held in memory for the lifetime of a loader.
#[derive(Debug, Clone)]
pub struct ClassArchive {
    path: PathBuf,
    prefix: &'static str,
    zip: RefCell<ZipArchive<Cursor<Vec<u8>>>>,
}

impl ClassArchive {
    /// Reads and opens the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidLocation`] if the file is unreadable or
    /// not a zip archive.
    pub fn open(fs: &dyn FileSystem, path: &Path) -> Result<Self, LoadError> {
        let invalid =
            |reason: String| LoadError::InvalidLocation { path: path.to_path_buf(), reason };
        let mut bytes = fs.read_bytes(path).map_err(|e| invalid(e.to_string()))?;
        let prefix = if bytes.starts_with(JMOD_MAGIC) {
            bytes.drain(..JMOD_MAGIC.len());
            JMOD_CLASSES
        } else {
            ""
        };
        let zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| invalid(format!("not a class archive: {e}")))?;
        Ok(Self { path: path.to_path_buf(), prefix, zip: RefCell::new(zip) })
    }

    /// The archive file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `(binary name, entry name)` for every class in the archive.
    ///
    /// `module-info` and everything under `META-INF/` are left out.
    #[must_use]
    pub fn class_entries(&self) -> Vec<(String, String)> {
        let zip = self.zip.borrow();
        zip.file_names()
            .filter_map(|entry| {
                let relative = entry.strip_prefix(self.prefix)?;
                if relative.starts_with("META-INF/") {
                    return None;
                }
                let stem = relative.strip_suffix(".class")?;
                if stem == "module-info" {
                    return None;
                }
                Some((stem.replace('/', "."), entry.to_string()))
            })
            .collect()
    }

    /// Reads one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is absent or fails to decompress.
    pub fn read(&self, entry: &str) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
        let mut zip = self.zip.borrow_mut();
        let mut file = zip.by_name(entry)?;
        let mut bytes = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
