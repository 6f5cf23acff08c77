//! Collection of helper functions.
use swc_atoms::JsWord;
use swc_ecma_ast::*;

/// Find the names bound by a declaration so they can be exported.
///
/// TypeScript declarations do not bind runtime values and yield
/// no names.
pub fn decl_words(decl: &Decl) -> Vec<&JsWord> {
    let mut names = Vec::new();
    match decl {
        Decl::Fn(func) => names.push(&func.ident.sym),
        Decl::Class(class) => names.push(&class.ident.sym),
        Decl::Var(var) => {
            for declarator in var.decls.iter() {
                pattern_words(&declarator.name, &mut names);
            }
        }
        _ => {}
    }
    names
}

/// Collect the identifiers bound by a pattern.
pub fn pattern_words<'a>(pat: &'a Pat, names: &mut Vec<&'a JsWord>) {
    match pat {
        Pat::Ident(binding) => names.push(&binding.id.sym),
        Pat::Object(obj) => {
            for prop in obj.props.iter() {
                match prop {
                    ObjectPatProp::Assign(entry) => {
                        names.push(&entry.key.sym);
                    }
                    ObjectPatProp::KeyValue(entry) => {
                        pattern_words(&*entry.value, names);
                    }
                    ObjectPatProp::Rest(entry) => {
                        pattern_words(&*entry.arg, names);
                    }
                }
            }
        }
        Pat::Array(arr) => {
            for elem in arr.elems.iter() {
                if let Some(ref elem) = elem {
                    pattern_words(elem, names);
                }
            }
        }
        Pat::Rest(rest) => {
            pattern_words(&*rest.arg, names);
        }
        Pat::Assign(assign) => {
            pattern_words(&*assign.left, names);
        }
        _ => {}
    }
}
