//! Discover and materialize every module reachable from an entry point.
//!
//! Modules are processed through a FIFO work queue. The queue is
//! drained one wave at a time: every queued module is read and
//! transformed (in parallel when enabled), then the dependencies of
//! the wave are resolved and registered in queue order. Registering
//! in queue order assigns exactly the identifiers a one module at a
//! time traversal would, so output does not depend on scheduling.
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::{
    error::Result,
    fs::FileSystem,
    module::{ModuleFactory, ModuleId, ModuleRecord},
    resolver::{ResolveOptions, Resolver},
    transform::Transform,
};

use super::{IdAllocator, ModuleGraph};

/// Options for building a graph.
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// Fallback candidates for resolution.
    pub resolve: ResolveOptions,
    /// Read and transform modules on the rayon thread pool.
    pub parallel: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            resolve: Default::default(),
            parallel: true,
        }
    }
}

/// Builds dependency graphs.
pub struct GraphBuilder {
    resolver: Resolver,
    factory: ModuleFactory,
    parallel: bool,
}

impl GraphBuilder {
    /// Create a graph builder.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        transformer: Arc<dyn Transform>,
        options: GraphOptions,
    ) -> Self {
        Self {
            resolver: Resolver::new(Arc::clone(&fs), options.resolve),
            factory: ModuleFactory::new(fs, transformer),
            parallel: options.parallel,
        }
    }

    /// The resolver used for dependency specifiers.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Build the graph for an entry point.
    ///
    /// Relative entry paths are resolved against the current
    /// working directory.
    pub fn build<P: AsRef<Path>>(&self, entry: P) -> Result<ModuleGraph> {
        let cwd = std::env::current_dir()?;
        self.build_from(entry, &cwd)
    }

    /// Build the graph for an entry point relative to a directory.
    pub fn build_from<P: AsRef<Path>>(
        &self,
        entry: P,
        cwd: &Path,
    ) -> Result<ModuleGraph> {
        let ids = IdAllocator::new();
        let mut visited: IndexMap<PathBuf, ModuleId> = IndexMap::new();
        let mut modules = BTreeMap::new();
        let mut queue = VecDeque::new();

        let entry_path = self.resolver.resolve_entry(entry.as_ref(), cwd)?;
        let entry_id = ids.next();
        visited.insert(entry_path.clone(), entry_id);
        queue.push_back((entry_id, entry_path));

        log::info!("Build graph from {}", entry.as_ref().display());

        while !queue.is_empty() {
            let wave: Vec<(ModuleId, PathBuf)> = queue.drain(..).collect();
            let processed = self.process(&wave)?;

            for (mut record, dependencies) in processed {
                for (specifier, path) in dependencies {
                    let id = match visited.get(&path) {
                        Some(id) => *id,
                        None => {
                            let id = ids.next();
                            visited.insert(path.clone(), id);
                            queue.push_back((id, path));
                            id
                        }
                    };
                    record.mapping.insert(specifier, id);
                }
                modules.insert(record.id, record);
            }
        }

        log::info!("Graph contains {} module(s)", ids.count());

        Ok(ModuleGraph {
            entry: entry_id,
            modules,
        })
    }

    /// Create the records for a wave of queued modules and resolve
    /// their dependencies relative to the directory of each record.
    fn process(
        &self,
        wave: &[(ModuleId, PathBuf)],
    ) -> Result<Vec<(ModuleRecord, Vec<(String, PathBuf)>)>> {
        let results: Vec<Result<(ModuleRecord, Vec<(String, PathBuf)>)>> =
            if self.parallel {
                wave.par_iter().map(|item| self.process_one(item)).collect()
            } else {
                wave.iter().map(|item| self.process_one(item)).collect()
            };
        // Report the failure of the earliest module in queue order.
        results.into_iter().collect()
    }

    fn process_one(
        &self,
        (id, path): &(ModuleId, PathBuf),
    ) -> Result<(ModuleRecord, Vec<(String, PathBuf)>)> {
        let record = self.factory.create(*id, path)?;
        let base = record.directory();
        let dependencies = record
            .dependencies
            .iter()
            .map(|specifier| -> Result<(String, PathBuf)> {
                let path = self.resolver.resolve(base, specifier)?;
                Ok((specifier.clone(), path))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((record, dependencies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fs::MemoryFileSystem;
    use crate::transform::ScriptTransformer;

    fn builder(fs: MemoryFileSystem, parallel: bool) -> GraphBuilder {
        GraphBuilder::new(
            Arc::new(fs),
            Arc::new(ScriptTransformer::new()),
            GraphOptions {
                parallel,
                ..Default::default()
            },
        )
    }

    fn build(fs: MemoryFileSystem) -> Result<ModuleGraph> {
        builder(fs, true).build_from("/app/entry.js", Path::new("/"))
    }

    fn id_of(graph: &ModuleGraph, path: &str) -> ModuleId {
        graph.find(path).unwrap().id
    }

    #[test]
    fn single_module() -> anyhow::Result<()> {
        let graph = build(
            MemoryFileSystem::new()
                .with_file("/app/entry.js", "module.exports = 1;"),
        )?;
        assert_eq!(0, graph.entry);
        assert_eq!(1, graph.len());
        assert!(graph.is_closed());
        Ok(())
    }

    #[test]
    fn acyclic_ids_follow_discovery_order() -> anyhow::Result<()> {
        let graph = build(
            MemoryFileSystem::new()
                .with_file(
                    "/app/entry.js",
                    "require('./a'); require('./b');",
                )
                .with_file("/app/a.js", "require('./c');")
                .with_file("/app/b.js", "require('./d');")
                .with_file("/app/c.js", "")
                .with_file("/app/d.js", ""),
        )?;
        assert_eq!(5, graph.len());
        assert_eq!(0, id_of(&graph, "/app/entry.js"));
        assert_eq!(1, id_of(&graph, "/app/a.js"));
        assert_eq!(2, id_of(&graph, "/app/b.js"));
        assert_eq!(3, id_of(&graph, "/app/c.js"));
        assert_eq!(4, id_of(&graph, "/app/d.js"));
        assert!(graph.is_closed());
        Ok(())
    }

    #[test]
    fn diamond_collapses() -> anyhow::Result<()> {
        let graph = build(
            MemoryFileSystem::new()
                .with_file("/app/entry.js", "require('./b'); require('./c');")
                .with_file("/app/b.js", "require('./d.js');")
                .with_file("/app/c.js", "require('./lib/../d');")
                .with_file("/app/d.js", "module.exports = 'd';"),
        )?;
        assert_eq!(4, graph.len());
        let d = id_of(&graph, "/app/d.js");
        let b = graph.get(id_of(&graph, "/app/b.js")).unwrap();
        let c = graph.get(id_of(&graph, "/app/c.js")).unwrap();
        assert_eq!(Some(&d), b.mapping.get("./d.js"));
        assert_eq!(Some(&d), c.mapping.get("./lib/../d"));
        Ok(())
    }

    #[test]
    fn cycle_terminates() -> anyhow::Result<()> {
        let graph = build(
            MemoryFileSystem::new()
                .with_file("/app/entry.js", "require('./a.js');")
                .with_file("/app/a.js", "require('./b.js');")
                .with_file("/app/b.js", "require('./a.js');"),
        )?;
        assert_eq!(3, graph.len());
        let a = id_of(&graph, "/app/a.js");
        let b = graph.get(id_of(&graph, "/app/b.js")).unwrap();
        assert_eq!(Some(&a), b.mapping.get("./a.js"));
        assert!(graph.is_closed());
        Ok(())
    }

    #[test]
    fn self_import() -> anyhow::Result<()> {
        let graph = build(
            MemoryFileSystem::new()
                .with_file("/app/entry.js", "require('./entry.js');"),
        )?;
        assert_eq!(1, graph.len());
        assert_eq!(Some(&0), graph.entry().unwrap().mapping.get("./entry.js"));
        Ok(())
    }

    #[test]
    fn mapping_follows_specifier_order() -> anyhow::Result<()> {
        let graph = build(
            MemoryFileSystem::new()
                .with_file(
                    "/app/entry.js",
                    "require('./z'); require('./a'); require('./m');",
                )
                .with_file("/app/z.js", "")
                .with_file("/app/a.js", "")
                .with_file("/app/m.js", ""),
        )?;
        let keys: Vec<&String> = graph.entry().unwrap().mapping.keys().collect();
        assert_eq!(vec!["./z", "./a", "./m"], keys);
        Ok(())
    }

    #[test]
    fn parallel_and_serial_agree() -> anyhow::Result<()> {
        let fs = MemoryFileSystem::new()
            .with_file("/app/entry.js", "require('./a'); require('./b');")
            .with_file("/app/a.js", "require('./shared'); require('./b');")
            .with_file("/app/b.js", "require('./c'); require('./shared');")
            .with_file("/app/c.js", "require('./a');")
            .with_file("/app/shared/index.js", "");
        let parallel =
            builder(fs.clone(), true).build_from("/app/entry.js", Path::new("/"))?;
        let serial =
            builder(fs, false).build_from("/app/entry.js", Path::new("/"))?;
        assert_eq!(parallel.len(), serial.len());
        for (id, module) in parallel.modules.iter() {
            let other = serial.get(*id).unwrap();
            assert_eq!(module.path, other.path);
            assert_eq!(module.mapping, other.mapping);
        }
        Ok(())
    }

    #[test]
    fn missing_dependency_fails() {
        let err = build(
            MemoryFileSystem::new()
                .with_file("/app/entry.js", "require('./missing.js');"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ModuleResolution { .. }));
    }

    #[test]
    fn missing_entry_fails() {
        let err = build(MemoryFileSystem::new()).unwrap_err();
        assert!(matches!(err, Error::ModuleResolution { .. }));
    }

    #[test]
    fn transform_failure_aborts() {
        let err = build(
            MemoryFileSystem::new()
                .with_file("/app/entry.js", "require('./bad.js');")
                .with_file("/app/bad.js", "function ("),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Transform { .. }));
    }

    #[test]
    fn earliest_failure_in_queue_order() {
        let fs = MemoryFileSystem::new()
            .with_file("/app/entry.js", "require('./a'); require('./b');")
            .with_file("/app/a.js", "require('./missing');")
            .with_file("/app/b.js", "function (");
        for parallel in &[true, false] {
            let err = builder(fs.clone(), *parallel)
                .build_from("/app/entry.js", Path::new("/"))
                .unwrap_err();
            match err {
                Error::ModuleResolution { specifier, .. } => {
                    assert_eq!("./missing", specifier)
                }
                other => panic!("unexpected error {}", other),
            }
        }
    }

    #[test]
    fn resolver_cache_is_shared() -> anyhow::Result<()> {
        let builder = builder(
            MemoryFileSystem::new()
                .with_file("/app/entry.js", "require('./a');")
                .with_file("/app/a.js", ""),
            true,
        );
        builder.build_from("/app/entry.js", Path::new("/"))?;
        assert_eq!(
            PathBuf::from("/app/a.js"),
            builder.resolver().resolve(Path::new("/app"), "./a")?
        );
        Ok(())
    }

    #[test]
    fn relative_entry() -> anyhow::Result<()> {
        let graph = builder(
            MemoryFileSystem::new().with_file("/app/src/main.js", ""),
            false,
        )
        .build_from("src/main", Path::new("/app"))?;
        assert_eq!(
            PathBuf::from("/app/src/main.js"),
            graph.entry().unwrap().path
        );
        Ok(())
    }
}
