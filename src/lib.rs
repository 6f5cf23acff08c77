//! Bundle CommonJS and ES modules into a single self executing script.
//!
//! The bundler walks the dependency graph from an entry point, compiles
//! every module to a CommonJS factory function and emits the factories
//! together with a small runtime loader that evaluates each module once
//! on first `require`.
use std::path::Path;
use std::sync::Arc;

pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod graph;
mod helpers;
pub mod module;
pub mod printer;
pub mod resolver;
mod swc_utils;
pub mod transform;

pub use bundler::{Bundle, BundleOptions, Bundler, EmitOptions};
pub use error::{Error, Result};
pub use graph::{GraphBuilder, GraphOptions, ModuleGraph};
pub use module::{ModuleId, ModuleRecord};

use crate::{fs::OsFileSystem, transform::ScriptTransformer};

/// Build the dependency graph for an entry point on disk.
pub fn build_graph<P: AsRef<Path>>(
    entry: P,
    options: GraphOptions,
) -> Result<ModuleGraph> {
    GraphBuilder::new(
        Arc::new(OsFileSystem),
        Arc::new(ScriptTransformer::new()),
        options,
    )
    .build(entry)
}

/// Bundle an entry point on disk.
pub fn bundle<P: AsRef<Path>>(
    entry: P,
    options: BundleOptions,
) -> Result<Bundle> {
    Bundler::new(options).bundle(entry)
}
