//! Dependency graph of the modules reachable from an entry point.
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering::SeqCst};

use serde::Serialize;

use crate::module::{ModuleId, ModuleRecord};

mod builder;

pub use builder::{GraphBuilder, GraphOptions};

/// Completed dependency graph.
///
/// Every identifier in a module mapping is a key of `modules`.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleGraph {
    /// Identifier of the entry point module.
    pub entry: ModuleId,
    /// Modules keyed by identifier.
    pub modules: BTreeMap<ModuleId, ModuleRecord>,
}

impl ModuleGraph {
    /// The entry point module.
    pub fn entry(&self) -> Option<&ModuleRecord> {
        self.modules.get(&self.entry)
    }

    /// Get a module by identifier.
    pub fn get(&self, id: ModuleId) -> Option<&ModuleRecord> {
        self.modules.get(&id)
    }

    /// Find a module by canonical path.
    pub fn find<P: AsRef<Path>>(&self, path: P) -> Option<&ModuleRecord> {
        self.modules
            .values()
            .find(|module| module.path == path.as_ref())
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Determine if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Determine if the graph has no dangling references.
    pub fn is_closed(&self) -> bool {
        self.modules.values().all(|module| {
            module.is_complete()
                && module
                    .mapping
                    .values()
                    .all(|id| self.modules.contains_key(id))
        })
    }
}

/// Allocates module identifiers for one build.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU32,
}

impl IdAllocator {
    /// Create an allocator starting at zero.
    pub fn new() -> Self {
        Default::default()
    }

    /// Allocate the next identifier.
    pub fn next(&self) -> ModuleId {
        self.next.fetch_add(1, SeqCst)
    }

    /// Number of identifiers allocated so far.
    pub fn count(&self) -> u32 {
        self.next.load(SeqCst)
    }
}
