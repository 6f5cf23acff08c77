//! Map import specifiers to canonical file paths.
//!
//! Resolution is purely path based: the specifier is joined with the
//! directory of the importing module and a fixed list of candidates is
//! probed in order. Nothing is executed and `node_modules` lookup is
//! not performed.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use path_clean::PathClean;

use crate::{
    error::{Error, Result},
    fs::FileSystem,
};

/// Extensions appended to a specifier that does not name a file.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".json"];

/// File names probed inside a directory.
pub const DEFAULT_INDEX_FILES: &[&str] = &["index"];

/// Options for the fallback candidates.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Extensions to append, in order, including the leading period.
    pub extensions: Vec<String>,
    /// Index file names (without extension) probed inside directories.
    pub index_files: Vec<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            index_files: DEFAULT_INDEX_FILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Resolves specifiers relative to a base directory.
///
/// Results are cached by base directory and specifier so repeated
/// imports of the same module only probe the file system once; the
/// cache may be shared by parallel resolutions.
pub struct Resolver {
    fs: Arc<dyn FileSystem>,
    options: ResolveOptions,
    cache: DashMap<(PathBuf, String), PathBuf>,
}

impl Resolver {
    /// Create a resolver.
    pub fn new(fs: Arc<dyn FileSystem>, options: ResolveOptions) -> Self {
        Self {
            fs,
            options,
            cache: DashMap::new(),
        }
    }

    /// The resolver options.
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve a specifier relative to the directory of the
    /// importing module.
    pub fn resolve(&self, base: &Path, specifier: &str) -> Result<PathBuf> {
        let key = (base.to_path_buf(), specifier.to_string());
        if let Some(entry) = self.cache.get(&key) {
            return Ok(entry.value().clone());
        }

        let tried = self.candidates(base, specifier);
        let found = tried.iter().find(|candidate| {
            log::trace!("Probe {}", candidate.display());
            self.fs.is_file(candidate)
        });

        let resolved = match found {
            Some(file) => self.fs.canonicalize(file)?,
            None => {
                return Err(Error::ModuleResolution {
                    specifier: specifier.to_string(),
                    base: base.to_path_buf(),
                    tried,
                })
            }
        };

        log::debug!("Resolved {} to {}", specifier, resolved.display());

        let entry = self.cache.entry(key).or_insert(resolved);
        Ok(entry.value().clone())
    }

    /// Resolve an entry point relative to the working directory.
    pub fn resolve_entry(&self, entry: &Path, cwd: &Path) -> Result<PathBuf> {
        self.resolve(cwd, &entry.to_string_lossy())
    }

    /// Candidate paths for a specifier, in probing order.
    ///
    /// Index files are only considered when the joined path is
    /// a directory.
    pub fn candidates(&self, base: &Path, specifier: &str) -> Vec<PathBuf> {
        let joined = base.join(specifier).clean();
        let mut candidates = vec![joined.clone()];

        for extension in self.options.extensions.iter() {
            candidates.push(append_extension(&joined, extension));
        }

        if self.fs.is_dir(&joined) {
            for index in self.options.index_files.iter() {
                for extension in self.options.extensions.iter() {
                    candidates.push(
                        joined.join(format!("{}{}", index, extension)),
                    );
                }
            }
        }

        candidates
    }
}

/// Append an extension without replacing an existing one so
/// that `./lib.config` probes `./lib.config.js`.
fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(extension);
    PathBuf::from(name)
}
