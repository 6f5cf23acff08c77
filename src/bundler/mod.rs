//! Generate bundles.
use std::path::Path;
use std::sync::Arc;

use crate::{
    error::Result,
    fs::{FileSystem, OsFileSystem},
    graph::{GraphBuilder, GraphOptions, ModuleGraph},
    transform::{ScriptTransformer, Transform},
};

mod serializer;

pub use serializer::{serialize, EmitOptions};

/// Options for bundling.
#[derive(Debug, Clone, Default)]
pub struct BundleOptions {
    /// Options for building the dependency graph.
    pub graph: GraphOptions,
    /// Options for the emitted artifact.
    pub emit: EmitOptions,
}

/// Generated artifact and the graph it was created from.
#[derive(Debug)]
pub struct Bundle {
    /// The dependency graph.
    pub graph: ModuleGraph,
    /// The artifact text.
    pub code: String,
}

/// Builds the dependency graph for an entry point and serializes
/// it with the runtime loader.
pub struct Bundler {
    builder: GraphBuilder,
    emit: EmitOptions,
}

impl Bundler {
    /// Create a bundler reading from the file system with the
    /// default transformer.
    pub fn new(options: BundleOptions) -> Self {
        Self::with(
            Arc::new(OsFileSystem),
            Arc::new(ScriptTransformer::new()),
            options,
        )
    }

    /// Create a bundler with custom collaborators.
    pub fn with(
        fs: Arc<dyn FileSystem>,
        transformer: Arc<dyn Transform>,
        options: BundleOptions,
    ) -> Self {
        Self {
            builder: GraphBuilder::new(fs, transformer, options.graph),
            emit: options.emit,
        }
    }

    /// The graph builder.
    pub fn builder(&self) -> &GraphBuilder {
        &self.builder
    }

    /// Generate a bundle for an entry point.
    pub fn bundle<P: AsRef<Path>>(&self, entry: P) -> Result<Bundle> {
        let graph = self.builder.build(entry)?;
        self.emit(graph)
    }

    /// Generate a bundle for an entry point relative to a directory.
    pub fn bundle_from<P: AsRef<Path>>(
        &self,
        entry: P,
        cwd: &Path,
    ) -> Result<Bundle> {
        let graph = self.builder.build_from(entry, cwd)?;
        self.emit(graph)
    }

    fn emit(&self, graph: ModuleGraph) -> Result<Bundle> {
        let code = serialize(&graph, &self.emit)?;
        log::info!(
            "Bundle contains {} module(s), {} bytes",
            graph.len(),
            code.len()
        );
        Ok(Bundle { graph, code })
    }
}

impl Bundle {
    /// Write the artifact to a file, creating parent directories.
    pub fn write<P: AsRef<Path>>(&self, output: P) -> Result<()> {
        let output = output.as_ref();
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(output, &self.code)?;
        log::info!("Wrote {}", output.display());
        Ok(())
    }
}
