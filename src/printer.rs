//! Print a module graph for inspection.
use std::collections::HashSet;

use serde_json::Value;

use crate::{
    error::Result,
    graph::ModuleGraph,
    module::{ModuleId, ModuleRecord},
};

const TREE_BAR: &str = "│";
const TREE_BRANCH: &str = "├──";
const TREE_CORNER: &str = "└──";

/// Options for printing a dependency tree.
#[derive(Debug, Default, Clone)]
pub struct PrintOptions {
    /// Print the module identifier after each specifier.
    pub include_id: bool,
    /// Print the file path after each specifier.
    pub include_file: bool,
}

struct PrintState {
    /// Whether the branch at each depth has reached its last child.
    open: Vec<bool>,
    /// Modules on the path from the root to the current branch.
    parents: Vec<ModuleId>,
    /// Modules whose dependencies have already been printed.
    expanded: HashSet<ModuleId>,
}

/// Render the dependency tree of a graph starting at the entry point.
///
/// An edge back to a module on the current path is marked with the
/// identifier it points to; a module reached again elsewhere is
/// marked and not expanded a second time.
pub fn tree(graph: &ModuleGraph, options: &PrintOptions) -> String {
    let mut out = String::new();
    let entry = match graph.entry() {
        Some(entry) => entry,
        None => return out,
    };

    out.push_str(&entry.path.display().to_string());
    if options.include_id {
        out.push_str(&format!(" ({})", entry.id));
    }
    out.push('\n');

    let mut state = PrintState {
        open: Vec::new(),
        parents: vec![entry.id],
        expanded: HashSet::new(),
    };
    state.expanded.insert(entry.id);
    print_dependencies(graph, entry, options, &mut state, &mut out);
    out
}

fn print_dependencies(
    graph: &ModuleGraph,
    module: &ModuleRecord,
    options: &PrintOptions,
    state: &mut PrintState,
    out: &mut String,
) {
    let count = module.mapping.len();
    state.open.push(false);
    for (i, (specifier, id)) in module.mapping.iter().enumerate() {
        let last = i == count - 1;
        if let Some(open) = state.open.last_mut() {
            *open = last;
        }

        for (depth, done) in state.open.iter().enumerate() {
            if depth == state.open.len() - 1 {
                let mark = if last { TREE_CORNER } else { TREE_BRANCH };
                out.push_str(mark);
                out.push(' ');
            } else if *done {
                out.push_str("    ");
            } else {
                out.push_str(TREE_BAR);
                out.push_str("   ");
            }
        }

        out.push_str(specifier);
        if options.include_id {
            out.push_str(&format!(" ({})", id));
        }

        let child = graph.get(*id);
        if options.include_file {
            if let Some(child) = child {
                out.push_str(&format!(" {}", child.path.display()));
            }
        }

        let cycle = state.parents.contains(id);
        let repeat = !cycle && state.expanded.contains(id);
        if cycle {
            out.push_str(&format!(" (∞ -> {})", id));
        } else if repeat {
            out.push_str(" (*)");
        }
        out.push('\n');

        if cycle || repeat {
            continue;
        }

        if let Some(child) = child {
            state.expanded.insert(child.id);
            if !child.mapping.is_empty() {
                state.parents.push(child.id);
                print_dependencies(graph, child, options, state, out);
                state.parents.pop();
            }
        }
    }
    state.open.pop();
}

/// Convert a graph to JSON, omitting compiled code unless requested.
pub fn graph_json(graph: &ModuleGraph, include_code: bool) -> Result<Value> {
    let mut value = serde_json::to_value(graph)?;
    if !include_code {
        if let Some(modules) =
            value.get_mut("modules").and_then(Value::as_object_mut)
        {
            for module in modules.values_mut() {
                if let Some(module) = module.as_object_mut() {
                    module.remove("code");
                }
            }
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::graph::GraphBuilder;
    use crate::transform::ScriptTransformer;

    fn build(fs: MemoryFileSystem) -> anyhow::Result<ModuleGraph> {
        Ok(GraphBuilder::new(
            Arc::new(fs),
            Arc::new(ScriptTransformer::new()),
            Default::default(),
        )
        .build_from("/app/entry.js", Path::new("/"))?)
    }

    #[test]
    fn print_tree() -> anyhow::Result<()> {
        let graph = build(
            MemoryFileSystem::new()
                .with_file("/app/entry.js", "require('./a'); require('./b');")
                .with_file("/app/a.js", "require('./c');")
                .with_file("/app/b.js", "require('./c');")
                .with_file("/app/c.js", ""),
        )?;
        let expected = "\
/app/entry.js
├── ./a
│   └── ./c
└── ./b
    └── ./c (*)
";
        assert_eq!(expected, tree(&graph, &Default::default()));
        Ok(())
    }

    #[test]
    fn print_tree_cycle() -> anyhow::Result<()> {
        let graph = build(
            MemoryFileSystem::new()
                .with_file("/app/entry.js", "require('./a.js');")
                .with_file("/app/a.js", "require('./b.js');")
                .with_file("/app/b.js", "require('./a.js');"),
        )?;
        let expected = "\
/app/entry.js (0)
└── ./a.js (1) /app/a.js
    └── ./b.js (2) /app/b.js
        └── ./a.js (1) /app/a.js (∞ -> 1)
";
        let options = PrintOptions {
            include_id: true,
            include_file: true,
        };
        assert_eq!(expected, tree(&graph, &options));
        Ok(())
    }

    #[test]
    fn json_without_code() -> anyhow::Result<()> {
        let graph = build(
            MemoryFileSystem::new()
                .with_file("/app/entry.js", "require('./a');")
                .with_file("/app/a.js", "module.exports = 1;"),
        )?;
        let value = graph_json(&graph, false)?;
        assert_eq!(0, value["entry"]);
        assert_eq!(1, value["modules"]["0"]["mapping"]["./a"]);
        assert_eq!("/app/a.js", value["modules"]["1"]["path"]);
        assert!(value["modules"]["1"].get("code").is_none());

        let value = graph_json(&graph, true)?;
        assert!(value["modules"]["1"]["code"].is_string());
        Ok(())
    }
}
