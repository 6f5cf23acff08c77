//! Lower ES module syntax to the CommonJS contract.
//!
//! The lowered module has this layout:
//!
//! 1. the `"use strict"` directive, the `__esModule` marker and one
//!    enumerable getter on `exports` for every exported binding, so
//!    importers observe live values even while this module is still
//!    initializing;
//! 2. the `require()` calls for imports and re-exports, in source order;
//! 3. the module body with export keywords stripped.
//!
//! Modules without import or export declarations are left untouched.
use swc_common::{errors::Handler, sync::Lrc, SourceMap};
use swc_ecma_ast::*;

use super::TransformError;
use crate::helpers::decl_words;
use crate::swc_utils::parse_stmts;

const BINDING_PREFIX: &str = "__cinder_";

/// Lower a module when it contains ES module declarations.
pub(super) fn lower(
    sm: &Lrc<SourceMap>,
    handler: &Handler,
    module: Module,
) -> Result<Module, TransformError> {
    let is_es_module = module
        .body
        .iter()
        .any(|item| matches!(item, ModuleItem::ModuleDecl(_)));
    if !is_es_module {
        return Ok(module);
    }

    let mut lowering = Lowering::new(sm, handler);
    for item in module.body {
        match item {
            ModuleItem::ModuleDecl(decl) => lowering.module_decl(decl)?,
            ModuleItem::Stmt(stmt) => lowering.body.push(stmt),
        }
    }

    Ok(Module {
        span: module.span,
        body: lowering.finish()?,
        shebang: module.shebang,
    })
}

struct Lowering<'a> {
    sm: &'a Lrc<SourceMap>,
    handler: &'a Handler,
    /// Getter definitions for exported names.
    exports: String,
    /// Hoisted `require()` calls and import bindings.
    imports: String,
    body: Vec<Stmt>,
    bindings: usize,
}

impl<'a> Lowering<'a> {
    fn new(sm: &'a Lrc<SourceMap>, handler: &'a Handler) -> Self {
        Self {
            sm,
            handler,
            exports: String::from(
                "\"use strict\";\n\
                 Object.defineProperty(exports, \"__esModule\", { value: true });\n",
            ),
            imports: String::new(),
            body: Vec::new(),
            bindings: 0,
        }
    }

    fn module_decl(&mut self, decl: ModuleDecl) -> Result<(), TransformError> {
        match decl {
            ModuleDecl::Import(import) => {
                if import.type_only {
                    return Ok(());
                }
                if import.specifiers.is_empty() {
                    self.imports.push_str(&format!(
                        "require({});\n",
                        quote(&import.src.value)
                    ));
                    return Ok(());
                }
                let module = self.require(&import.src.value);
                for spec in import.specifiers.iter() {
                    let (local, value) = match spec {
                        ImportSpecifier::Default(item) => {
                            (&item.local.sym, default_interop(&module))
                        }
                        ImportSpecifier::Namespace(item) => {
                            (&item.local.sym, module.clone())
                        }
                        ImportSpecifier::Named(item) => {
                            let imported = item
                                .imported
                                .as_ref()
                                .unwrap_or(&item.local)
                                .sym
                                .as_ref();
                            (&item.local.sym, member(&module, imported))
                        }
                    };
                    self.imports
                        .push_str(&format!("var {} = {};\n", local, value));
                }
            }
            ModuleDecl::ExportDecl(export) => {
                for name in decl_words(&export.decl) {
                    self.export(name, name);
                }
                self.body.push(Stmt::Decl(export.decl));
            }
            ModuleDecl::ExportNamed(named) => {
                if named.type_only {
                    return Ok(());
                }
                let module = named.src.as_ref().map(|src| self.require(&src.value));
                for spec in named.specifiers.iter() {
                    match (spec, &module) {
                        (ExportSpecifier::Named(item), Some(module)) => {
                            let exported =
                                item.exported.as_ref().unwrap_or(&item.orig);
                            self.export(
                                &exported.sym,
                                &member(module, &item.orig.sym),
                            );
                        }
                        (ExportSpecifier::Named(item), None) => {
                            let exported =
                                item.exported.as_ref().unwrap_or(&item.orig);
                            self.export(&exported.sym, &item.orig.sym);
                        }
                        (ExportSpecifier::Namespace(item), Some(module)) => {
                            self.export(&item.name.sym, module);
                        }
                        (ExportSpecifier::Default(item), Some(module)) => {
                            self.export(
                                &item.exported.sym,
                                &default_interop(module),
                            );
                        }
                        _ => {
                            return Err(TransformError::new(
                                "namespace and default re-exports need a source module",
                            ))
                        }
                    }
                }
            }
            ModuleDecl::ExportDefaultDecl(export) => match export.decl {
                DefaultDecl::Fn(FnExpr {
                    ident: Some(ident),
                    function,
                }) => {
                    self.export("default", &ident.sym);
                    self.body.push(Stmt::Decl(Decl::Fn(FnDecl {
                        ident,
                        declare: false,
                        function,
                    })));
                }
                DefaultDecl::Fn(func) => {
                    let stmt = self.assign_default(Expr::Fn(func))?;
                    self.body.push(stmt);
                }
                DefaultDecl::Class(ClassExpr {
                    ident: Some(ident),
                    class,
                }) => {
                    self.export("default", &ident.sym);
                    self.body.push(Stmt::Decl(Decl::Class(ClassDecl {
                        ident,
                        declare: false,
                        class,
                    })));
                }
                DefaultDecl::Class(class) => {
                    let stmt = self.assign_default(Expr::Class(class))?;
                    self.body.push(stmt);
                }
                _ => {}
            },
            ModuleDecl::ExportDefaultExpr(export) => {
                let stmt = self.assign_default(*export.expr)?;
                self.body.push(stmt);
            }
            ModuleDecl::ExportAll(export) => {
                let module = self.require(&export.src.value);
                self.imports.push_str(&format!(
                    "Object.keys({module}).forEach(function (key) {{\n\
                     if (key === \"default\" || key === \"__esModule\") return;\n\
                     if (Object.prototype.hasOwnProperty.call(exports, key)) return;\n\
                     Object.defineProperty(exports, key, {{ enumerable: true, get: function () {{ return {module}[key]; }} }});\n\
                     }});\n",
                    module = module
                ));
            }
            _ => {
                return Err(TransformError::new(
                    "TypeScript module declarations are not supported",
                ))
            }
        }
        Ok(())
    }

    /// Hoist a `require()` call and return the binding holding
    /// the exports of the required module.
    fn require(&mut self, specifier: &str) -> String {
        let name = format!("{}{}", BINDING_PREFIX, self.bindings);
        self.bindings += 1;
        self.imports.push_str(&format!(
            "var {} = require({});\n",
            name,
            quote(specifier)
        ));
        name
    }

    /// Define a live getter on `exports`.
    fn export(&mut self, name: &str, value: &str) {
        self.exports.push_str(&format!(
            "Object.defineProperty(exports, {}, {{ enumerable: true, get: function () {{ return {}; }} }});\n",
            quote(name),
            value
        ));
    }

    /// Statement assigning an expression to `exports.default`.
    fn assign_default(&self, expr: Expr) -> Result<Stmt, TransformError> {
        let mut stmts = parse_stmts(
            self.sm,
            self.handler,
            String::from("exports.default = void 0;"),
        )?;
        let mut stmt = stmts.remove(0);
        if let Stmt::Expr(expr_stmt) = &mut stmt {
            if let Expr::Assign(assign) = &mut *expr_stmt.expr {
                assign.right = Box::new(expr);
            }
        }
        Ok(stmt)
    }

    fn finish(self) -> Result<Vec<ModuleItem>, TransformError> {
        let mut stmts = parse_stmts(self.sm, self.handler, self.exports)?;
        stmts.extend(parse_stmts(self.sm, self.handler, self.imports)?);
        stmts.extend(self.body);
        Ok(stmts.into_iter().map(ModuleItem::Stmt).collect())
    }
}

/// Quote a string as a JavaScript string literal.
fn quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

fn member(object: &str, property: &str) -> String {
    format!("{}[{}]", object, quote(property))
}

fn default_interop(module: &str) -> String {
    format!(
        "{module} && {module}.__esModule ? {module}.default : {module}",
        module = module
    )
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::transform::{ScriptTransformer, Transform};

    fn lower(source: &str) -> String {
        ScriptTransformer::new()
            .transform(Path::new("/app/module.mjs"), source)
            .unwrap()
            .code
    }

    #[test]
    fn exports_are_getters_before_imports() {
        let code = lower(
            r#"
            import { add } from './math.js';
            export function sum(a, b) { return add(a, b); }
            "#,
        );
        let getter = code.find("\"sum\"").unwrap();
        let require = code.find("require(\"./math.js\")").unwrap();
        assert!(getter < require);
        assert!(code.contains("function sum("));
    }

    #[test]
    fn lowered_module_is_strict() {
        let code = lower("export const a = 1;");
        assert!(code.trim_start().starts_with("\"use strict\""));
        let untouched = lower("module.exports = 1;");
        assert!(!untouched.contains("use strict"));
    }

    #[test]
    fn export_names_from_patterns() {
        let code = lower(
            r#"
            export const { a, b: [c, ...d] } = source(), e = 1;
            "#,
        );
        for name in &["\"a\"", "\"c\"", "\"d\"", "\"e\""] {
            assert!(code.contains(name), "missing export {}", name);
        }
        assert!(!code.contains("\"b\""));
    }

    #[test]
    fn export_default_expression() {
        let code = lower("export default 40 + 2;");
        assert!(code.contains("exports.default = 40 + 2"));
    }

    #[test]
    fn export_default_named_function() {
        let code = lower("export default function main() { return 1; }");
        assert!(code.contains("\"default\""));
        assert!(code.contains("function main()"));
        assert!(!code.contains("exports.default ="));
    }

    #[test]
    fn export_default_anonymous_class() {
        let code = lower("export default class {}");
        assert!(code.contains("exports.default = class"));
    }

    #[test]
    fn reexports() {
        let code = lower(
            r#"
            export { a as b } from './a.js';
            export * from './c.js';
            "#,
        );
        assert!(code.contains("__cinder_0[\"a\"]"));
        assert!(code.contains("\"b\""));
        assert!(code.contains("Object.keys(__cinder_1)"));
    }

    #[test]
    fn side_effect_import() {
        let code = lower("import './polyfill.js';");
        assert!(code.contains("require(\"./polyfill.js\")"));
        assert!(!code.contains("__cinder_0"));
    }

    #[test]
    fn commonjs_is_untouched() {
        let code = lower("module.exports = 42;");
        assert!(!code.contains("__esModule"));
        assert!(code.contains("module.exports = 42"));
    }
}
