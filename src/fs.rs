//! File system access used to read sources and probe candidate paths.
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

/// Operations the resolver and module factory need from a file system.
pub trait FileSystem: Send + Sync {
    /// Read a file to a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Determine if a path points to an existing file.
    fn is_file(&self, path: &Path) -> bool;

    /// Determine if a path points to an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Get the canonical form of an existing path.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// File system backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        path.canonicalize()
    }
}

/// File system held in memory.
///
/// Paths are compared after lexical normalization so `/src/./a.js`
/// and `/src/lib/../a.js` name the same file. Directories exist
/// implicitly when a file lives beneath them.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    /// Create an empty file system.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a file, replacing any existing content.
    pub fn insert<P: AsRef<Path>, S: Into<String>>(
        &mut self,
        path: P,
        content: S,
    ) {
        self.files.insert(path.as_ref().clean(), content.into());
    }

    /// Builder style variant of `insert()`.
    pub fn with_file<P: AsRef<Path>, S: Into<String>>(
        mut self,
        path: P,
        content: S,
    ) -> Self {
        self.insert(path, content);
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(&path.clean()).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&path.clean())
    }

    fn is_dir(&self, path: &Path) -> bool {
        let dir = path.clean();
        self.files
            .keys()
            .any(|file| file != &dir && file.starts_with(&dir))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let path = path.clean();
        if self.files.contains_key(&path) || self.is_dir(&path) {
            Ok(path)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ))
        }
    }
}
