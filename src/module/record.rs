//! Build time representation of one compiled module.
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

/// Numeric module identifier.
///
/// Identifiers are assigned in discovery order starting at zero; the
/// entry point is always zero.
pub type ModuleId = u32;

/// A source file after transformation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    /// The module identifier.
    pub id: ModuleId,
    /// Canonical file path, unique within a graph.
    pub path: PathBuf,
    /// Compiled body of the module factory function.
    pub code: String,
    /// Dependency specifiers in declaration order.
    pub dependencies: Vec<String>,
    /// Resolved identifier for each dependency specifier.
    ///
    /// Empty until the graph builder has resolved every dependency.
    pub mapping: IndexMap<String, ModuleId>,
}

impl ModuleRecord {
    /// Create a record with an empty dependency mapping.
    pub fn new(
        id: ModuleId,
        path: PathBuf,
        code: String,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            id,
            path,
            code,
            dependencies,
            mapping: Default::default(),
        }
    }

    /// Directory that relative specifiers are resolved against.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// Determine if every dependency has been mapped to a module.
    pub fn is_complete(&self) -> bool {
        self.dependencies
            .iter()
            .all(|spec| self.mapping.contains_key(spec))
    }
}
