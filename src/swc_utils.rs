//! Helpers to get a handler, parser or code generator.
use swc_common::{
    errors::{emitter::ColorConfig, Handler},
    sync::Lrc,
    FileName, SourceFile, SourceMap,
};
use swc_ecma_ast::{Module, ModuleItem, Program, Stmt};
use swc_ecma_codegen::{text_writer::JsWriter, Emitter};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};

use crate::transform::TransformError;

pub(crate) fn get_handler(sm: Lrc<SourceMap>) -> Handler {
    Handler::with_tty_emitter(ColorConfig::Auto, true, false, Some(sm))
}

pub(crate) fn get_parser<'a>(
    fm: &'a SourceFile,
) -> Parser<Lexer<'a, StringInput<'a>>> {
    let lexer = Lexer::new(
        // We want to parse ecmascript
        Syntax::Es(Default::default()),
        Default::default(),
        StringInput::from(fm),
        None,
    );
    Parser::new_from(lexer)
}

/// Parse source text as a module.
///
/// Only sources with import or export declarations are parsed in
/// strict mode; scripts keep sloppy mode semantics and are returned
/// as a module of plain statements.
///
/// Diagnostics are emitted to the handler; any error, recoverable
/// or not, fails the parse.
pub(crate) fn parse_module(
    sm: &Lrc<SourceMap>,
    handler: &Handler,
    file_name: FileName,
    source: String,
) -> Result<Module, TransformError> {
    let fm = sm.new_source_file(file_name, source);
    let mut parser = get_parser(&*fm);

    let result = parser.parse_program();

    let mut first_error = None;
    for e in parser.take_errors() {
        if first_error.is_none() {
            first_error = Some(format!("{:?}", e.kind()));
        }
        e.into_diagnostic(handler).emit();
    }

    let program = result.map_err(|e| {
        let message = format!("{:?}", e.kind());
        e.into_diagnostic(handler).emit();
        TransformError::new(message)
    })?;

    let module = match program {
        Program::Module(module) => module,
        Program::Script(script) => Module {
            span: script.span,
            body: script.body.into_iter().map(ModuleItem::Stmt).collect(),
            shebang: script.shebang,
        },
    };

    match first_error {
        Some(message) => Err(TransformError::new(message)),
        None => Ok(module),
    }
}

/// Parse generated source text as a list of statements.
pub(crate) fn parse_stmts(
    sm: &Lrc<SourceMap>,
    handler: &Handler,
    source: String,
) -> Result<Vec<Stmt>, TransformError> {
    let fm = sm.new_source_file(FileName::Anon, source);
    let mut parser = get_parser(&*fm);
    let script = parser.parse_script().map_err(|e| {
        let message = format!("{:?}", e.kind());
        e.into_diagnostic(handler).emit();
        TransformError::new(message)
    })?;
    Ok(script.body)
}

/// Print a module to source text.
pub(crate) fn print_module(
    sm: &Lrc<SourceMap>,
    module: &Module,
) -> Result<String, TransformError> {
    let mut buf = Vec::new();
    {
        let wr = JsWriter::new(sm.clone(), "\n", &mut buf, None);
        let mut emitter = Emitter {
            cfg: Default::default(),
            cm: sm.clone(),
            comments: None,
            wr: Box::new(wr),
        };
        emitter
            .emit_module(module)
            .map_err(|e| TransformError::new(e.to_string()))?;
    }
    String::from_utf8(buf).map_err(|e| TransformError::new(e.to_string()))
}
