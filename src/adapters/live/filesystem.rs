//! Live filesystem adapter using `std::fs`.

use std::path::{Path, PathBuf};

use crate::ports::filesystem::FileSystem;

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_bytes(
        &self,
        path: &Path,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(std::fs::read(path)?)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(
        &self,
        path: &Path,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn canonicalize(
        &self,
        path: &Path,
    ) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
        Ok(std::fs::canonicalize(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_sorted_entries_and_reads_bytes() {
        let dir = std::env::temp_dir().join("apisurface_live_fs_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("pkg")).unwrap();
        std::fs::write(dir.join("b.class"), [1, 2, 3]).unwrap();
        std::fs::write(dir.join("a.class"), [4]).unwrap();

        let fs = LiveFileSystem;
        assert!(fs.is_dir(&dir));
        assert!(!fs.is_dir(&dir.join("a.class")));
        assert_eq!(fs.list_dir(&dir).unwrap(), vec!["a.class", "b.class", "pkg"]);
        assert_eq!(fs.read_bytes(&dir.join("b.class")).unwrap(), vec![1, 2, 3]);
        assert!(fs.read_bytes(&dir.join("missing.class")).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn canonicalize_resolves_symlinks() {
        let dir = std::env::temp_dir().join("apisurface_live_fs_links");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("real")).unwrap();
        std::os::unix::fs::symlink(dir.join("real"), dir.join("alias")).unwrap();

        let fs = LiveFileSystem;
        let real = fs.canonicalize(&dir.join("real")).unwrap();
        assert_eq!(fs.canonicalize(&dir.join("alias")).unwrap(), real);
        assert!(fs.canonicalize(&dir.join("missing")).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
