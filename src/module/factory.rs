//! Create module records from resolved file paths.
use std::path::Path;
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    fs::FileSystem,
    transform::Transform,
};

use super::record::{ModuleId, ModuleRecord};

/// Reads and transforms modules.
///
/// Holds no mutable state so a single factory can be shared by
/// every worker thread of a build.
#[derive(Clone)]
pub struct ModuleFactory {
    fs: Arc<dyn FileSystem>,
    transformer: Arc<dyn Transform>,
}

impl ModuleFactory {
    /// Create a module factory.
    pub fn new(fs: Arc<dyn FileSystem>, transformer: Arc<dyn Transform>) -> Self {
        Self { fs, transformer }
    }

    /// Read and transform the file at a canonical path.
    ///
    /// The identifier is the one allocated when the path was first
    /// discovered.
    pub fn create(&self, id: ModuleId, path: &Path) -> Result<ModuleRecord> {
        let source =
            self.fs
                .read_to_string(path)
                .map_err(|source| Error::SourceRead {
                    path: path.to_path_buf(),
                    source,
                })?;

        let output = self.transformer.transform(path, &source).map_err(
            |source| Error::Transform {
                path: path.to_path_buf(),
                source,
            },
        )?;

        log::debug!(
            "Module {} {} ({} dependencies)",
            id,
            path.display(),
            output.dependencies.len()
        );

        Ok(ModuleRecord::new(
            id,
            path.to_path_buf(),
            output.code,
            output.dependencies,
        ))
    }
}
