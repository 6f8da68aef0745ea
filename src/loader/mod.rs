//! Artifact loader: resolves type names against compiled class files.
//!
//! Resolution goes through these layers, most specific first:
//!
//! ```text
//! artifact root   (directory of <root>/**/*.class, or a jar)
//! platform root   (--platform-root, else $JAVA_HOME jmods or rt.jar)
//! bootstrap table (built-in core java.lang types)
//! opaque          (java.*, javax.*, jdk.* ancestors nothing defines)
//! ```
//!
//! Primitive and `void` names never consult any layer.

pub mod archive;
pub mod bootstrap;
pub mod primitives;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::classfile::{self, ClassFile, ClassFormatError};
use crate::ports::filesystem::FileSystem;
use archive::ClassArchive;
pub use primitives::Primitive;

/// Errors raised while locating or loading type definitions.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The root is not a usable directory of class files.
    #[error("invalid artifact root {}: {reason}", .path.display())]
    InvalidLocation {
        /// The offending path.
        path: PathBuf,
        /// Why it could not be used.
        reason: String,
    },
    /// The name is defined nowhere.
    #[error("class not found: {name}")]
    ClassNotFound {
        /// The requested name.
        name: String,
    },
    /// A name that was known to exist can no longer be found.
    #[error("{}", missing_message(.name, .referenced_by.as_deref()))]
    ClassDefinitionMissing {
        /// The name that disappeared.
        name: String,
        /// The class whose definition refers to it, if any.
        referenced_by: Option<String>,
    },
    /// A class file sits at a path that does not match the class it defines.
    #[error(
        "{} defines {found}, expected {expected}; the artifact root may point at the wrong directory level",
        .path.display()
    )]
    WrongName {
        /// The class file location.
        path: PathBuf,
        /// Name implied by the location.
        expected: String,
        /// Name recorded in the class file.
        found: String,
    },
    /// A class file exists but cannot be decoded.
    #[error("malformed class file for {name}: {source}")]
    Malformed {
        /// The class being loaded.
        name: String,
        /// The decoding failure.
        #[source]
        source: ClassFormatError,
    },
}

fn missing_message(name: &str, referenced_by: Option<&str>) -> String {
    match referenced_by {
        Some(owner) => format!(
            "class definition missing: {name} (referenced by {owner}); the artifact root may be out of date with the build"
        ),
        None => format!(
            "class definition missing: {name} was indexed but can no longer be read; the artifact root may be out of date with the build"
        ),
    }
}

/// Where an indexed class file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassLocation {
    /// A loose `.class` file.
    File(PathBuf),
    /// An entry of one of the index's archives.
    Entry {
        /// Position of the archive within the index.
        archive: usize,
        /// Entry name inside the archive.
        entry: String,
    },
}

/// Name → class-file location lookup for one directory tree or archive set.
#[derive(Debug, Clone, Default)]
pub struct ArtifactIndex {
    root: PathBuf,
    archives: Vec<ClassArchive>,
    entries: BTreeMap<String, ClassLocation>,
}

impl ArtifactIndex {
    /// Indexes every class under `root` by binary name.
    ///
    /// `root` is either a directory of `*.class` files laid out by package or
    /// a `.jar`, `.zip` or `.jmod` archive. Unreadable subdirectories are
    /// skipped with a warning, and a directory reached twice through links is
    /// walked once.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidLocation`] if `root` is neither a readable
    /// directory nor a readable archive.
    pub fn build(fs: &dyn FileSystem, root: &Path) -> Result<Self, LoadError> {
        let mut index = Self { root: root.to_path_buf(), ..Self::default() };
        if fs.is_dir(root) {
            index.add_directory(fs, root)?;
        } else if archive::is_archive_path(root) {
            index.add_archive(ClassArchive::open(fs, root)?);
        } else {
            return Err(LoadError::InvalidLocation {
                path: root.to_path_buf(),
                reason: "not a directory or class archive".to_string(),
            });
        }
        debug!(root = %root.display(), classes = index.entries.len(), "built artifact index");
        Ok(index)
    }

    /// Indexes the platform classes of the JDK installed at `home`.
    ///
    /// Reads `jmods/*.jmod` (first definition wins, in file-name order), or
    /// `lib/rt.jar` / `jre/lib/rt.jar` on older layouts. Returns `None` with a
    /// warning when neither is present.
    #[must_use]
    pub fn java_home(fs: &dyn FileSystem, home: &Path) -> Option<Self> {
        let jmods = home.join("jmods");
        let mut archives = Vec::new();
        if fs.is_dir(&jmods) {
            match fs.list_dir(&jmods) {
                Ok(names) => archives.extend(
                    names
                        .iter()
                        .filter(|name| name.ends_with(".jmod"))
                        .map(|name| jmods.join(name)),
                ),
                Err(e) => warn!(path = %jmods.display(), error = %e, "unreadable jmods directory"),
            }
        }
        if archives.is_empty() {
            archives.extend(
                ["lib/rt.jar", "jre/lib/rt.jar"]
                    .iter()
                    .map(|relative| home.join(relative))
                    .find(|path| fs.canonicalize(path).is_ok() && !fs.is_dir(path)),
            );
        }

        let mut index = Self { root: home.to_path_buf(), ..Self::default() };
        for path in archives {
            match ClassArchive::open(fs, &path) {
                Ok(archive) => index.add_archive(archive),
                Err(e) => warn!(error = %e, "skipping unreadable platform archive"),
            }
        }
        if index.is_empty() {
            warn!(
                java_home = %home.display(),
                "no platform classes under JAVA_HOME; only built-in core types are known"
            );
            return None;
        }
        debug!(java_home = %home.display(), classes = index.len(), "indexed platform classes");
        Some(index)
    }

    fn add_archive(&mut self, archive: ClassArchive) {
        let slot = self.archives.len();
        for (name, entry) in archive.class_entries() {
            self.entries.entry(name).or_insert(ClassLocation::Entry { archive: slot, entry });
        }
        self.archives.push(archive);
    }

    fn add_directory(&mut self, fs: &dyn FileSystem, root: &Path) -> Result<(), LoadError> {
        let invalid =
            |reason: String| LoadError::InvalidLocation { path: root.to_path_buf(), reason };
        let top = fs.list_dir(root).map_err(|e| invalid(e.to_string()))?;
        let mut visited = HashSet::new();
        visited.insert(fs.canonicalize(root).map_err(|e| invalid(e.to_string()))?);

        let mut pending: Vec<(PathBuf, Vec<String>, Vec<String>)> =
            vec![(root.to_path_buf(), Vec::new(), top)];
        while let Some((dir, package, names)) = pending.pop() {
            for entry in names {
                let path = dir.join(&entry);
                if fs.is_dir(&path) {
                    let canonical = match fs.canonicalize(&path) {
                        Ok(canonical) => canonical,
                        Err(e) => {
                            warn!(
                                path = %path.display(),
                                error = %e,
                                "skipping unresolvable directory"
                            );
                            continue;
                        }
                    };
                    if !visited.insert(canonical) {
                        debug!(path = %path.display(), "directory already indexed");
                        continue;
                    }
                    match fs.list_dir(&path) {
                        Ok(children) => {
                            let mut child_package = package.clone();
                            child_package.push(entry);
                            pending.push((path, child_package, children));
                        }
                        Err(e) => {
                            warn!(
                                path = %path.display(),
                                error = %e,
                                "skipping unreadable directory"
                            );
                        }
                    }
                } else if let Some(stem) = entry.strip_suffix(".class") {
                    if stem == "module-info" {
                        continue;
                    }
                    let mut segments = package.clone();
                    segments.push(stem.to_string());
                    self.entries.entry(segments.join(".")).or_insert(ClassLocation::File(path));
                }
            }
        }
        Ok(())
    }

    /// Returns the location of a class, or `None` if the root does not define it.
    #[must_use]
    pub fn locate(&self, name: &str) -> Option<&ClassLocation> {
        self.entries.get(name)
    }

    /// Reads the bytes stored at `location`.
    ///
    /// # Errors
    ///
    /// Returns the file system or archive error if the bytes are gone.
    pub fn read(
        &self,
        fs: &dyn FileSystem,
        location: &ClassLocation,
    ) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
        match location {
            ClassLocation::File(path) => fs.read_bytes(path),
            ClassLocation::Entry { archive, entry } => {
                self.archives.get(*archive).ok_or("archive not in this index")?.read(entry)
            }
        }
    }

    /// A path naming `location` in diagnostics.
    #[must_use]
    pub fn display_path(&self, location: &ClassLocation) -> PathBuf {
        match location {
            ClassLocation::File(path) => path.clone(),
            ClassLocation::Entry { archive, entry } => self
                .archives
                .get(*archive)
                .map_or_else(|| self.root.join(entry), |a| a.path().join(entry)),
        }
    }

    /// Number of indexed classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no classes were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The directory or archive this index was built from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// A resolved type.
#[derive(Debug, Clone)]
pub enum TypeHandle {
    /// A primitive or `void`.
    Primitive(Primitive),
    /// A class or interface.
    Class(Rc<ClassFile>),
    /// An array of the given component type.
    Array(Box<TypeHandle>),
}

impl TypeHandle {
    /// Display name in source form (`int`, `a.B`, `a.B[][]`).
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            TypeHandle::Primitive(p) => p.name().to_string(),
            TypeHandle::Class(class) => class.name.clone(),
            TypeHandle::Array(component) => format!("{}[]", component.name()),
        }
    }
}

/// Splits an array name into its element name and dimension.
///
/// Accepts descriptor form (`[I`, `[[Ljava.lang.String;`) and source form
/// (`int[]`, `java.lang.String[][]`). Returns `None` for non-array names.
fn split_array_name(name: &str) -> Option<(String, usize)> {
    if name.starts_with('[') {
        let dimension = name.bytes().take_while(|b| *b == b'[').count();
        let element = &name[dimension..];
        let element = if let Some(class) =
            element.strip_prefix('L').and_then(|rest| rest.strip_suffix(';'))
        {
            class.replace('/', ".")
        } else {
            let mut chars = element.chars();
            let primitive = chars.next().and_then(Primitive::from_descriptor);
            match (primitive, chars.next()) {
                (Some(p), None) => p.name().to_string(),
                // Unparseable descriptors resolve to nothing.
                _ => String::new(),
            }
        };
        return Some((element, dimension));
    }

    let mut element = name;
    let mut dimension = 0;
    while let Some(rest) = element.strip_suffix("[]") {
        element = rest.trim_end();
        dimension += 1;
    }
    (dimension > 0).then(|| (element.to_string(), dimension))
}

/// Which layer supplied a class definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassSource {
    /// The artifact root.
    Artifact,
    /// The configured platform root.
    Platform,
    /// The built-in bootstrap table.
    Bootstrap,
    /// Stand-in for a platform class no layer defines.
    Opaque,
}

/// Resolves names to types for one artifact root.
///
/// Parsed classes are memoized for the lifetime of the loader.
pub struct ClassLoader<'a> {
    fs: &'a dyn FileSystem,
    artifacts: ArtifactIndex,
    platform: Option<ArtifactIndex>,
    cache: RefCell<HashMap<String, (Rc<ClassFile>, ClassSource)>>,
}

impl<'a> ClassLoader<'a> {
    /// Indexes `root` (and `platform_root`, if given) and returns a loader.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidLocation`] if either directory is unusable.
    pub fn open(
        fs: &'a dyn FileSystem,
        root: &Path,
        platform_root: Option<&Path>,
    ) -> Result<Self, LoadError> {
        let artifacts = ArtifactIndex::build(fs, root)?;
        let platform = platform_root.map(|path| ArtifactIndex::build(fs, path)).transpose()?;
        Ok(Self { fs, artifacts, platform, cache: RefCell::new(HashMap::new()) })
    }

    /// Uses the JDK at `java_home` as the platform layer, unless a platform
    /// root is already configured.
    #[must_use]
    pub fn with_java_home(mut self, java_home: &Path) -> Self {
        if self.platform.is_none() {
            self.platform = ArtifactIndex::java_home(self.fs, java_home);
        }
        self
    }

    /// The index of the artifact root.
    #[must_use]
    pub fn artifacts(&self) -> &ArtifactIndex {
        &self.artifacts
    }

    /// Resolves any type name: primitive, array, class, or interface.
    ///
    /// Returns `Ok(None)` when the name is defined nowhere.
    ///
    /// # Errors
    ///
    /// Returns an error if a definition exists but cannot be loaded.
    pub fn resolve(&self, name: &str) -> Result<Option<TypeHandle>, LoadError> {
        let name = name.trim();
        if let Some(primitive) = Primitive::from_name(name) {
            return Ok(Some(TypeHandle::Primitive(primitive)));
        }

        if let Some((element, dimension)) = split_array_name(name) {
            let Some(mut handle) = self.resolve(&element)? else {
                return Ok(None);
            };
            if matches!(handle, TypeHandle::Primitive(Primitive::Void) | TypeHandle::Array(_)) {
                return Ok(None);
            }
            for _ in 0..dimension {
                handle = TypeHandle::Array(Box::new(handle));
            }
            return Ok(Some(handle));
        }

        Ok(self.load_class(name)?.map(TypeHandle::Class))
    }

    /// Loads a class or interface by binary name.
    ///
    /// Returns `Ok(None)` when no layer defines the name.
    ///
    /// # Errors
    ///
    /// Returns an error if an indexed definition is unreadable, malformed, or
    /// defines a different class than its location implies.
    pub fn load_class(&self, name: &str) -> Result<Option<Rc<ClassFile>>, LoadError> {
        if let Some((class, source)) = self.cache.borrow().get(name) {
            return Ok((*source != ClassSource::Opaque).then(|| Rc::clone(class)));
        }

        let platform = self.platform.as_ref();
        let loaded = if let Some(location) = self.artifacts.locate(name) {
            Some((self.read_class(name, &self.artifacts, location)?, ClassSource::Artifact))
        } else if let Some((index, location)) =
            platform.and_then(|index| index.locate(name).map(|location| (index, location)))
        {
            Some((self.read_class(name, index, location)?, ClassSource::Platform))
        } else {
            bootstrap::bootstrap_class(name).map(|class| (class, ClassSource::Bootstrap))
        };

        let Some((class, source)) = loaded else {
            debug!(name, "class not found in any layer");
            return Ok(None);
        };
        debug!(name, ?source, "loaded class");

        let class = Rc::new(class);
        self.cache.borrow_mut().insert(name.to_string(), (Rc::clone(&class), source));
        Ok(Some(class))
    }

    /// Loads a class that an already loaded class refers to.
    ///
    /// A platform ancestor (`java.*`, `javax.*`, `jdk.*`) that no layer
    /// defines is replaced by an opaque class extending `java.lang.Object`
    /// with no members, and a warning is logged once per name.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ClassDefinitionMissing`] if a non-platform name
    /// is no longer defined, or any error from [`ClassLoader::load_class`].
    pub fn require_class(
        &self,
        name: &str,
        referenced_by: &str,
    ) -> Result<Rc<ClassFile>, LoadError> {
        if let Some(class) = self.load_class(name)? {
            return Ok(class);
        }
        if !bootstrap::is_platform_name(name) {
            return Err(LoadError::ClassDefinitionMissing {
                name: name.to_string(),
                referenced_by: Some(referenced_by.to_string()),
            });
        }
        if let Some((class, ClassSource::Opaque)) = self.cache.borrow().get(name) {
            return Ok(Rc::clone(class));
        }
        warn!(
            name,
            referenced_by,
            "platform class has no definition; treating it as a direct subclass of \
             java.lang.Object without members (set --platform-root or JAVA_HOME)"
        );
        let class = Rc::new(bootstrap::opaque_class(name));
        self.cache.borrow_mut().insert(name.to_string(), (Rc::clone(&class), ClassSource::Opaque));
        Ok(class)
    }

    /// Which layer supplied `name`, if it has been loaded.
    #[must_use]
    pub fn source_of(&self, name: &str) -> Option<ClassSource> {
        self.cache.borrow().get(name).map(|(_, source)| *source)
    }

    fn read_class(
        &self,
        name: &str,
        index: &ArtifactIndex,
        location: &ClassLocation,
    ) -> Result<ClassFile, LoadError> {
        let bytes = index.read(self.fs, location).map_err(|e| {
            let path = index.display_path(location);
            debug!(name, path = %path.display(), error = %e, "indexed class file unreadable");
            LoadError::ClassDefinitionMissing { name: name.to_string(), referenced_by: None }
        })?;
        let class = classfile::parse_class(&bytes)
            .map_err(|source| LoadError::Malformed { name: name.to_string(), source })?;
        if class.name != name {
            return Err(LoadError::WrongName {
                path: index.display_path(location),
                expected: name.to_string(),
                found: class.name,
            });
        }
        Ok(class)
    }
}
