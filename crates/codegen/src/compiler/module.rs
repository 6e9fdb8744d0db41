//! Whole-program emission

use crate::backend::Backend;
use crate::compiler::context::CodegenContext;
use crate::compiler::decl::DeclEmitter;
use crate::config::EmitterConfig;
use crate::error::CodegenResult;
use crate::ir::builder::IrBuilder;
use crate::ir::verify::verify_module;
use crate::EmitOutput;
use glint_ast::{Ast, Diagnostic, Program};
use log::info;

pub struct ModuleCompiler<'a, B: Backend = IrBuilder> {
    ctx: CodegenContext<'a, B>,
}

impl<'a> ModuleCompiler<'a, IrBuilder> {
    pub fn new(ast: &'a Ast, config: &'a EmitterConfig) -> Self {
        Self::with_backend(ast, config, IrBuilder::new(config.module_name.clone()))
    }

    /// Emit every top-level declaration and return the finished module.
    ///
    /// Source errors are collected in [`EmitOutput::diagnostics`]; only
    /// internal failures and verifier rejections abort with `Err`.
    pub fn emit(mut self, program: &Program) -> CodegenResult<EmitOutput> {
        self.emit_decls(program)?;
        let verify = self.ctx.config.verify;
        let (builder, diagnostics) = self.ctx.into_parts();
        let module = builder.into_module();
        if verify {
            verify_module(&module)?;
        }
        Ok(EmitOutput {
            module,
            diagnostics,
        })
    }
}

impl<'a, B: Backend> ModuleCompiler<'a, B> {
    pub fn with_backend(ast: &'a Ast, config: &'a EmitterConfig, backend: B) -> Self {
        Self {
            ctx: CodegenContext::new(ast, config, backend),
        }
    }

    /// Emit the top-level declarations in order, in the module scope.
    pub fn emit_decls(&mut self, program: &Program) -> CodegenResult<()> {
        info!("emitting {} top-level declaration(s)", program.decls.len());
        for &decl in &program.decls {
            if self.ctx.error_limit_reached() {
                info!("error limit reached, stopping");
                break;
            }
            let emitted = DeclEmitter::emit(&mut self.ctx, decl);
            self.ctx.recover(emitted)?;
        }
        info!(
            "emission finished with {} error(s), {} warning(s)",
            self.ctx.diagnostics.error_count(),
            self.ctx.diagnostics.warning_count()
        );
        Ok(())
    }

    pub fn context(&self) -> &CodegenContext<'a, B> {
        &self.ctx
    }

    /// Hand back the backend and the collected diagnostics.
    pub fn finish(self) -> (B, Vec<Diagnostic>) {
        self.ctx.into_parts()
    }
}
