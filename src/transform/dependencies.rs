//! Collect the dependency specifiers declared by a module.
//!
//! Static imports, re-exports and calls to `require()` with a single
//! string literal argument are dependencies. Calls to `import()` are
//! recorded separately as they are not bundled.
use indexmap::IndexSet;

use swc_atoms::JsWord;
use swc_common::DUMMY_SP;
use swc_ecma_ast::*;
use swc_ecma_visit::{Node, Visit, VisitWith};

const REQUIRE: &str = "require";
const IMPORT: &str = "import";

/// Specifiers found in a module.
#[derive(Debug, Default)]
pub struct Dependencies {
    /// Specifiers in order of first appearance.
    pub specifiers: IndexSet<String>,
    /// Specifiers passed to `import()`.
    pub dynamic: IndexSet<String>,
}

/// Collect the dependencies of a module in source order.
pub fn collect_dependencies(module: &Module) -> Dependencies {
    let mut collector = DependencyCollector::default();
    module.visit_with(&Invalid { span: DUMMY_SP } as _, &mut collector);
    collector.dependencies
}

#[derive(Default)]
struct DependencyCollector {
    dependencies: Dependencies,
}

impl DependencyCollector {
    fn push(&mut self, specifier: &JsWord) {
        self.dependencies.specifiers.insert(specifier.to_string());
    }
}

impl Visit for DependencyCollector {
    fn visit_import_decl(&mut self, n: &ImportDecl, _: &dyn Node) {
        if !n.type_only {
            self.push(&n.src.value);
        }
    }

    fn visit_named_export(&mut self, n: &NamedExport, _: &dyn Node) {
        if n.type_only {
            return;
        }
        if let Some(src) = &n.src {
            self.push(&src.value);
        }
    }

    fn visit_export_all(&mut self, n: &ExportAll, _: &dyn Node) {
        self.push(&n.src.value);
    }

    fn visit_call_expr(&mut self, n: &CallExpr, _: &dyn Node) {
        if let Some(specifier) = is_simple_call(n, REQUIRE) {
            self.push(specifier);
        } else if let Some(specifier) = is_simple_call(n, IMPORT) {
            self.dependencies.dynamic.insert(specifier.to_string());
        }
        n.visit_children_with(self);
    }
}

/// Detect a call to a function with a single string literal argument.
pub(crate) fn is_simple_call<'a>(
    call: &'a CallExpr,
    fn_name: &'static str,
) -> Option<&'a JsWord> {
    if call.args.len() != 1 {
        return None;
    }
    if let ExprOrSuper::Expr(n) = &call.callee {
        if let Expr::Ident(id) = &**n {
            if id.sym.as_ref() == fn_name {
                let arg = &call.args[0];
                if arg.spread.is_some() {
                    return None;
                }
                if let Expr::Lit(Lit::Str(s)) = &*arg.expr {
                    return Some(&s.value);
                }
            }
        }
    }
    None
}
