//! Emission context holding state during IR generation

use crate::backend::Backend;
use crate::compiler::targets::{JumpTarget, TargetStack};
use crate::config::EmitterConfig;
use crate::error::{CodegenError, CodegenResult};
use crate::ir::{BlockId, FuncId, IrType};
use crate::symbol::{ScopeKind, ScopeStack};
use glint_ast::error::{Diagnostic, DiagnosticCollector, ErrorCode};
use glint_ast::{Ast, DeclId, StmtId};
use log::warn;
use text_size::TextRange;

/// The function whose body is being emitted.
#[derive(Debug, Clone, Copy)]
pub struct FunctionState {
    pub func: FuncId,
    pub decl: DeclId,
    pub return_ty: IrType,
}

pub struct CodegenContext<'a, B: Backend> {
    pub ast: &'a Ast,
    pub config: &'a EmitterConfig,
    pub backend: B,
    pub scopes: ScopeStack,
    pub targets: TargetStack,
    pub diagnostics: DiagnosticCollector,
    pub function: Option<FunctionState>,
    emitted_decls: Vec<bool>,
    emitted_stmts: Vec<bool>,
}

impl<'a, B: Backend> CodegenContext<'a, B> {
    pub fn new(ast: &'a Ast, config: &'a EmitterConfig, backend: B) -> Self {
        Self {
            ast,
            config,
            backend,
            scopes: ScopeStack::new(),
            targets: TargetStack::new(),
            diagnostics: DiagnosticCollector::new(),
            function: None,
            emitted_decls: vec![false; ast.decl_count()],
            emitted_stmts: vec![false; ast.stmt_count()],
        }
    }

    /// Record that `decl` is being emitted; a second emission is an internal error.
    pub fn mark_decl_emitted(&mut self, decl: DeclId) -> CodegenResult<()> {
        let seen = self
            .emitted_decls
            .get_mut(decl.index())
            .ok_or_else(|| CodegenError::internal(format!("{} is not in this AST", decl)))?;
        if std::mem::replace(seen, true) {
            return Err(CodegenError::internal(format!("{} emitted twice", decl)));
        }
        Ok(())
    }

    /// Record that `stmt` is being emitted; a second emission is an internal error.
    pub fn mark_stmt_emitted(&mut self, stmt: StmtId) -> CodegenResult<()> {
        let seen = self
            .emitted_stmts
            .get_mut(stmt.index())
            .ok_or_else(|| CodegenError::internal(format!("{} is not in this AST", stmt)))?;
        if std::mem::replace(seen, true) {
            return Err(CodegenError::internal(format!("{} emitted twice", stmt)));
        }
        Ok(())
    }

    /// Run `f` inside a fresh scope. The scope is popped on every path.
    pub fn with_scope<T>(
        &mut self,
        kind: ScopeKind,
        f: impl FnOnce(&mut Self) -> CodegenResult<T>,
    ) -> CodegenResult<T> {
        self.scopes.push_scope(kind);
        let result = f(self);
        let popped = self.scopes.pop_scope();
        let value = result?;
        popped?;
        Ok(value)
    }

    /// Run `f` with `target` as the innermost jump target. The target is
    /// popped on every path.
    pub fn with_target<T>(
        &mut self,
        target: JumpTarget,
        f: impl FnOnce(&mut Self) -> CodegenResult<T>,
    ) -> CodegenResult<T> {
        self.targets.push(target);
        let result = f(self);
        let popped = self.targets.pop();
        let value = result?;
        popped?;
        Ok(value)
    }

    pub fn current_function(&self) -> CodegenResult<FunctionState> {
        self.function
            .ok_or_else(|| CodegenError::internal("statement emitted outside of a function"))
    }

    /// Append a block to the current function.
    pub fn new_block(&mut self, label: &str) -> CodegenResult<BlockId> {
        let func = self.current_function()?.func;
        Ok(self.backend.create_basic_block(func, label))
    }

    /// Move the insertion point to the end of `block` in the current function.
    pub fn position_at(&mut self, block: BlockId) -> CodegenResult<()> {
        let func = self.current_function()?.func;
        self.backend.position_at_end(func, block);
        Ok(())
    }

    /// The block instructions are currently appended to.
    pub fn current_block(&self) -> CodegenResult<BlockId> {
        self.backend
            .insert_point()
            .map(|ip| ip.block)
            .ok_or_else(|| CodegenError::internal("no insertion point set"))
    }

    /// Branch to `target` unless the current block already ended.
    pub fn branch_if_open(&mut self, target: BlockId) -> CodegenResult<()> {
        if !self.backend.is_terminated() {
            self.backend.create_br(target)?;
        }
        Ok(())
    }

    /// Collect a recoverable error; fatal errors are handed back.
    pub fn report(&mut self, err: CodegenError) -> CodegenResult<()> {
        if err.is_fatal() {
            return Err(err);
        }
        warn!("{}", err);
        self.diagnostics.report(err.to_diagnostic());
        Ok(())
    }

    /// Turn a recoverable failure into a collected diagnostic.
    pub fn recover<T>(&mut self, result: CodegenResult<T>) -> CodegenResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => self.report(err).map(|()| None),
        }
    }

    /// Record a warning unless the configuration filters it out.
    pub fn warn(&mut self, code: ErrorCode, message: String, span: TextRange) {
        if !self.config.errors.should_report(code.severity(), Some(code)) {
            return;
        }
        warn!("{}", message);
        self.diagnostics.report(Diagnostic::from_code(code, message, span));
    }

    /// Whether the configured error budget is used up.
    pub fn error_limit_reached(&self) -> bool {
        self.diagnostics.error_count() >= self.config.max_errors()
    }

    pub fn into_parts(self) -> (B, Vec<Diagnostic>) {
        (self.backend, self.diagnostics.into_diagnostics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::IrBuilder;
    use glint_ast::Identifier;

    #[test]
    fn test_scope_popped_when_closure_fails() {
        let ast = Ast::new();
        let config = EmitterConfig::new();
        let mut ctx = CodegenContext::new(&ast, &config, IrBuilder::new("m"));

        let result: CodegenResult<()> = ctx.with_scope(ScopeKind::Block, |ctx| {
            assert_eq!(ctx.scopes.depth(), 2);
            Err(CodegenError::BreakOutsideTarget {
                span: TextRange::default(),
            })
        });

        assert!(result.is_err());
        assert!(ctx.scopes.is_global_scope());
    }

    #[test]
    fn test_second_emission_is_internal_error() {
        let mut ast = Ast::new();
        let x = ast.var_decl(
            Identifier::new("x", TextRange::default()),
            Some(glint_ast::Type::Int),
            None,
            None,
        );
        let config = EmitterConfig::new();
        let mut ctx = CodegenContext::new(&ast, &config, IrBuilder::new("m"));

        ctx.mark_decl_emitted(x).unwrap();
        assert!(ctx.mark_decl_emitted(x).unwrap_err().is_fatal());
    }

    #[test]
    fn test_recover_collects_source_errors_only() {
        let ast = Ast::new();
        let config = EmitterConfig::new();
        let mut ctx = CodegenContext::new(&ast, &config, IrBuilder::new("m"));

        let recovered: Option<()> = ctx
            .recover(Err(CodegenError::ContinueOutsideLoop {
                span: TextRange::default(),
            }))
            .unwrap();
        assert!(recovered.is_none());
        assert_eq!(ctx.diagnostics.error_count(), 1);

        assert!(ctx.recover::<()>(Err(CodegenError::internal("boom"))).is_err());
        assert_eq!(ctx.diagnostics.error_count(), 1);
    }
}
