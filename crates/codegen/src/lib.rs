//! # Glint Code Generation
//!
//! This crate lowers a type-checked Glint AST into an LLVM-style SSA module.
//!
//! ## Architecture
//!
//! The emission pipeline:
//! 1. **Input**: [`Ast`] arena and its [`Program`] root from the front end
//! 2. **Declarations**: globals at module scope, `alloca` slots in functions
//! 3. **Statements**: structured control flow lowered to basic blocks
//! 4. **Verification**: structural checks over the finished [`Module`]
//! 5. **Output**: [`EmitOutput`] with the module and collected diagnostics
//!
//! ## Usage
//!
//! ```rust
//! use glint_ast::{Ast, Expr, Identifier, Type};
//! use glint_codegen::compile;
//! use text_size::TextRange;
//!
//! let mut ast = Ast::new();
//! let g = ast.var_decl(
//!     Identifier::new("g", TextRange::default()),
//!     Some(Type::Int),
//!     None,
//!     Some(Expr::int(5)),
//! );
//! let program = ast.program(vec![g]);
//!
//! let module = compile(&ast, &program).unwrap();
//! assert!(module.to_string().contains("@g = global i32 5"));
//! ```

pub mod backend;
pub mod compiler;
pub mod config;
pub mod error;
pub mod ir;
pub mod symbol;

pub use backend::{Backend, InsertPoint};
pub use compiler::module::ModuleCompiler;
pub use config::EmitterConfig;
pub use error::{CodegenError, CodegenResult};
pub use ir::builder::IrBuilder;
pub use ir::Module;

use glint_ast::error::{DiagnosticFormatter, ErrorConfig};
use glint_ast::{Ast, Diagnostic, Program};

/// Result of a completed emission run.
#[derive(Debug, Clone)]
pub struct EmitOutput {
    pub module: Module,
    /// Errors and warnings in source order of discovery
    pub diagnostics: Vec<Diagnostic>,
}

impl EmitOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Render the diagnostics against the source text the spans point into.
    ///
    /// Filtering and layout follow `errors`; reported diagnostics are
    /// separated by blank lines.
    pub fn render(&self, source: &str, filename: Option<&str>, errors: &ErrorConfig) -> String {
        let diagnostics: Vec<Diagnostic> = self
            .diagnostics
            .iter()
            .map(|d| d.clone().with_source(source, filename))
            .collect();
        DiagnosticFormatter::new(errors).format_all(&diagnostics)
    }
}

/// Emit `program` with the given configuration.
///
/// Source errors are returned inside [`EmitOutput`]; `Err` means emission
/// itself failed.
pub fn emit_program(
    ast: &Ast,
    program: &Program,
    config: &EmitterConfig,
) -> CodegenResult<EmitOutput> {
    ModuleCompiler::new(ast, config).emit(program)
}

/// Emit `program` with the default configuration.
///
/// # Returns
/// The module, or every diagnostic when any error was reported
pub fn compile(ast: &Ast, program: &Program) -> Result<Module, Vec<Diagnostic>> {
    let config = EmitterConfig::default();
    match emit_program(ast, program, &config) {
        Ok(output) if output.has_errors() => Err(output.diagnostics),
        Ok(output) => Ok(output.module),
        Err(err) => Err(vec![err.to_diagnostic()]),
    }
}
