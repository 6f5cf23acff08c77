//! Turn source text into a module factory body and its dependencies.
//!
//! Script files are parsed with swc, their dependency specifiers are
//! collected in source order and ES module syntax is lowered to the
//! CommonJS contract of the runtime loader. JSON files become a single
//! `module.exports` assignment.
use std::fmt;
use std::path::Path;

use swc_common::{sync::Lrc, FileName, SourceMap};
use swc_ecma_transforms_base::fixer::fixer;
use swc_ecma_visit::FoldWith;

use crate::swc_utils::{get_handler, parse_module, print_module};

mod commonjs;
mod dependencies;
mod json;

pub use dependencies::collect_dependencies;

/// Failure reported by a transformer.
///
/// Opaque to the bundler, it only carries a message.
#[derive(Debug, Clone)]
pub struct TransformError {
    message: String,
}

impl TransformError {
    /// Create a transform error.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransformError {}

/// Output of a transformer for one module.
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    /// Body of the module factory function.
    pub code: String,
    /// Dependency specifiers in declaration order.
    pub dependencies: Vec<String>,
}

/// Source transformer contract.
///
/// Implementations must be shareable between threads as the graph
/// builder may transform several modules at once.
pub trait Transform: Send + Sync {
    /// Transform the source text of the module at `path`.
    fn transform(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<TransformOutput, TransformError>;
}

/// Default transformer.
///
/// Files with a `.json` extension are JSON modules, everything else
/// is parsed as a script.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptTransformer;

impl ScriptTransformer {
    /// Create a script transformer.
    pub fn new() -> Self {
        ScriptTransformer
    }

    fn transform_script(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<TransformOutput, TransformError> {
        let sm: Lrc<SourceMap> = Default::default();
        let handler = get_handler(sm.clone());

        let module = parse_module(
            &sm,
            &handler,
            FileName::Real(path.to_path_buf()),
            source.to_string(),
        )?;

        let dependencies = collect_dependencies(&module);
        for dynamic in dependencies.dynamic.iter() {
            log::warn!(
                "Dynamic import of '{}' in {} is not bundled",
                dynamic,
                path.display()
            );
        }

        let mut module = commonjs::lower(&sm, &handler, module)?;
        // The body is wrapped in a factory function.
        module.shebang = None;
        let module = module.fold_with(&mut fixer(None));
        let code = print_module(&sm, &module)?;

        Ok(TransformOutput {
            code,
            dependencies: dependencies.specifiers.into_iter().collect(),
        })
    }
}

impl Transform for ScriptTransformer {
    fn transform(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<TransformOutput, TransformError> {
        let is_json = path
            .extension()
            .map(|ext| ext == "json")
            .unwrap_or(false);
        if is_json {
            json::transform(source)
        } else {
            self.transform_script(path, source)
        }
    }
}
