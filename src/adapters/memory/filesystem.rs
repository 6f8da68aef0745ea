//! In-memory adapter for the `FileSystem` port.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::classfile::builder::ClassFileBuilder;
use crate::ports::filesystem::FileSystem;

/// Bound on link hops while resolving one path component.
const MAX_LINK_HOPS: usize = 40;

/// Serves files from an in-memory tree.
///
/// Directories are implied by the files placed under them; empty
/// directories can be added explicitly. Symbolic links map a path to an
/// absolute target and are followed by every operation.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    links: BTreeMap<PathBuf, PathBuf>,
}

impl MemoryFileSystem {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given contents.
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Adds an empty directory.
    pub fn insert_dir(&mut self, path: impl Into<PathBuf>) {
        self.dirs.insert(path.into());
    }

    /// Adds a symbolic link at `link` pointing to the absolute path `target`.
    pub fn insert_link(&mut self, link: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.links.insert(link.into(), target.into());
    }

    /// Encodes a class and places it under `root` at its package path.
    pub fn insert_class(&mut self, root: &Path, class: &ClassFileBuilder) {
        let mut path = root.to_path_buf();
        for segment in class.name().split('.') {
            path.push(segment);
        }
        path.set_extension("class");
        self.insert(path, class.build());
    }

    /// Removes a file, returning `true` if it existed.
    pub fn remove(&mut self, path: &Path) -> bool {
        self.files.remove(path).is_some()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        let mut resolved = PathBuf::new();
        for component in path.components() {
            resolved.push(component);
            let mut hops = 0;
            while let Some(target) = self.links.get(&resolved) {
                if hops == MAX_LINK_HOPS {
                    break;
                }
                resolved.clone_from(target);
                hops += 1;
            }
        }
        resolved
    }

    fn is_resolved_dir(&self, path: &Path) -> bool {
        self.dirs.iter().any(|dir| dir.starts_with(path))
            || self.files.keys().any(|file| file != path && file.starts_with(path))
            || self.links.keys().any(|link| link != path && link.starts_with(path))
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_bytes(
        &self,
        path: &Path,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        self.files
            .get(&self.resolve(path))
            .cloned()
            .ok_or_else(|| format!("no such file: {}", path.display()).into())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_resolved_dir(&self.resolve(path))
    }

    fn list_dir(
        &self,
        path: &Path,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let path = self.resolve(path);
        if !self.is_resolved_dir(&path) {
            return Err(format!("not a directory: {}", path.display()).into());
        }
        let entries: BTreeSet<String> = self
            .files
            .keys()
            .chain(self.dirs.iter())
            .chain(self.links.keys())
            .filter_map(|entry| entry.strip_prefix(&path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|first| first.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(entries.into_iter().collect())
    }

    fn canonicalize(
        &self,
        path: &Path,
    ) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
        let resolved = self.resolve(path);
        if self.files.contains_key(&resolved) || self.is_resolved_dir(&resolved) {
            Ok(resolved)
        } else {
            Err(format!("no such file or directory: {}", path.display()).into())
        }
    }
}
