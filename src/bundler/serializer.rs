//! Serialize a module graph to the artifact text.
//!
//! The artifact is the runtime loader applied to the loader table:
//!
//! ```text
//! (function (modules) { ... })({
//! 0: [function (require, module, exports) { ... }, {"./math.js":1}],
//! 1: [function (require, module, exports) { ... }, {}],
//! });
//! ```
use crate::{error::Result, graph::ModuleGraph, module::ModuleRecord};

const RUNTIME: &str = include_str!("runtime.js");
const ENTRY_PLACEHOLDER: &str = "__ENTRY_ID__";

/// Options for the emitted artifact.
#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    /// Variable that receives the exports of the entry module.
    pub global_name: Option<String>,
}

/// Serialize a completed graph.
///
/// Modules are written in ascending identifier order so the output
/// is stable for an unchanged set of files.
pub fn serialize(graph: &ModuleGraph, options: &EmitOptions) -> Result<String> {
    let mut out = String::new();
    if let Some(name) = &options.global_name {
        out.push_str(&format!("var {} = ", name));
    }

    out.push_str(
        RUNTIME
            .trim_end()
            .replace(ENTRY_PLACEHOLDER, &graph.entry.to_string())
            .as_str(),
    );

    out.push_str("({\n");
    for module in graph.modules.values() {
        write_module(&mut out, module)?;
    }
    out.push_str("});\n");
    Ok(out)
}

/// Write one loader table entry.
fn write_module(out: &mut String, module: &ModuleRecord) -> Result<()> {
    let mapping = serde_json::to_string(&module.mapping)?;
    out.push_str(&format!(
        "{id}: [function (require, module, exports) {{\n{code}\n}}, {mapping}],\n",
        id = module.id,
        code = module.code.trim_end(),
        mapping = mapping,
    ));
    Ok(())
}
