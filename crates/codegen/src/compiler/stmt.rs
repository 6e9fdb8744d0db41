//! Statement lowering to basic blocks
//!
//! Structured statements become explicit blocks and branches. After any
//! statement that terminates the current block, the rest of the enclosing
//! sequence is skipped, so no instruction ever follows a terminator.

use crate::backend::Backend;
use crate::compiler::const_eval::ConstEvaluator;
use crate::compiler::context::CodegenContext;
use crate::compiler::decl::DeclEmitter;
use crate::compiler::expr::ExprEmitter;
use crate::compiler::targets::JumpTarget;
use crate::error::{CodegenError, CodegenResult};
use crate::ir::{BlockId, CmpPred, Constant, IrType, Value};
use crate::symbol::ScopeKind;
use glint_ast::ast::{ForStmt, IfStmt, ReturnStmt, StmtBlock, SwitchStmt, WhileStmt};
use glint_ast::error::ErrorCode;
use glint_ast::{Expr, Stmt, StmtId};
use indexmap::IndexMap;
use log::trace;
use text_size::TextRange;

pub struct StmtEmitter;

impl StmtEmitter {
    pub fn emit<B: Backend>(ctx: &mut CodegenContext<'_, B>, id: StmtId) -> CodegenResult<()> {
        ctx.mark_stmt_emitted(id)?;
        let ast = ctx.ast;
        let stmt = ast.stmt(id);
        trace!("emit {} {}", stmt.kind_name(), id);

        match stmt {
            Stmt::Block(block) => {
                ctx.with_scope(ScopeKind::Block, |ctx| Self::emit_block_body(ctx, block))
            }
            Stmt::Expr(s) => ExprEmitter::emit_effect(ctx, &s.expr),
            Stmt::Decl(s) => DeclEmitter::emit(ctx, s.decl),
            Stmt::If(s) => Self::emit_if(ctx, s),
            Stmt::While(s) => Self::emit_while(ctx, s),
            Stmt::For(s) => Self::emit_for(ctx, s),
            Stmt::Switch(s) => Self::emit_switch(ctx, s),
            Stmt::Case(_) | Stmt::Default(_) => {
                Err(CodegenError::CaseOutsideSwitch { span: stmt.span() })
            }
            Stmt::Break(span) => {
                let target = ctx
                    .targets
                    .break_target()
                    .ok_or(CodegenError::BreakOutsideTarget { span: *span })?;
                ctx.backend.create_br(target)
            }
            Stmt::Continue(span) => {
                let target = ctx
                    .targets
                    .continue_target()
                    .ok_or(CodegenError::ContinueOutsideLoop { span: *span })?;
                ctx.backend.create_br(target)
            }
            Stmt::Return(s) => Self::emit_return(ctx, s),
        }
    }

    /// Emit a function body block in the already open function scope.
    pub fn emit_function_body<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        body: StmtId,
    ) -> CodegenResult<()> {
        ctx.mark_stmt_emitted(body)?;
        let ast = ctx.ast;
        match ast.stmt(body) {
            Stmt::Block(block) => Self::emit_block_body(ctx, block),
            other => Err(CodegenError::internal(format!(
                "function body is a {}, not a block",
                other.kind_name()
            ))),
        }
    }

    fn emit_block_body<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        block: &StmtBlock,
    ) -> CodegenResult<()> {
        for &decl in &block.decls {
            if ctx.error_limit_reached() {
                return Ok(());
            }
            let emitted = DeclEmitter::emit(ctx, decl);
            ctx.recover(emitted)?;
        }
        Self::emit_sequence(ctx, &block.stmts)
    }

    /// Emit statements in order, stopping once the current block is terminated.
    fn emit_sequence<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        stmts: &[StmtId],
    ) -> CodegenResult<()> {
        for (index, &stmt) in stmts.iter().enumerate() {
            if ctx.error_limit_reached() {
                return Ok(());
            }
            if ctx.backend.is_terminated() {
                Self::report_unreachable(ctx, &stmts[index..]);
                return Ok(());
            }
            let emitted = Self::emit(ctx, stmt);
            ctx.recover(emitted)?;
        }
        Ok(())
    }

    fn report_unreachable<B: Backend>(ctx: &mut CodegenContext<'_, B>, skipped: &[StmtId]) {
        let (Some(first), Some(last)) = (skipped.first(), skipped.last()) else {
            return;
        };
        if !ctx.config.warn_unreachable {
            return;
        }
        let ast = ctx.ast;
        let span = ast.stmt(*first).span().cover(ast.stmt(*last).span());
        ctx.warn(
            ErrorCode::W3100,
            format!("{} unreachable statement(s) skipped", skipped.len()),
            span,
        );
    }

    /// Emit a branch condition. A malformed condition is reported and
    /// replaced by `false` so the surrounding control flow stays intact.
    fn emit_test<B: Backend>(ctx: &mut CodegenContext<'_, B>, test: &Expr) -> CodegenResult<Value> {
        let cond = ExprEmitter::emit_condition(ctx, test);
        Ok(ctx
            .recover(cond)?
            .unwrap_or(Value::Const(Constant::Bool(false))))
    }

    /// Emit a nested statement, collecting recoverable errors.
    fn emit_nested<B: Backend>(ctx: &mut CodegenContext<'_, B>, id: StmtId) -> CodegenResult<()> {
        let emitted = Self::emit(ctx, id);
        ctx.recover(emitted).map(drop)
    }

    fn emit_if<B: Backend>(ctx: &mut CodegenContext<'_, B>, s: &IfStmt) -> CodegenResult<()> {
        let cond = Self::emit_test(ctx, &s.test)?;
        let then_block = ctx.new_block("if.then")?;
        let else_block = match s.else_body {
            Some(_) => Some(ctx.new_block("if.else")?),
            None => None,
        };
        let mut merge = match else_block {
            Some(_) => None,
            None => Some(ctx.new_block("if.merge")?),
        };
        let false_target = match (else_block, merge) {
            (Some(block), _) | (None, Some(block)) => block,
            (None, None) => return Err(CodegenError::internal("`if` without a false target")),
        };
        ctx.backend.create_cond_br(cond, then_block, false_target)?;

        // Arms that fall through, identified by the block they end in.
        let mut open_ends: Vec<BlockId> = Vec::with_capacity(2);
        ctx.position_at(then_block)?;
        Self::emit_nested(ctx, s.then_body)?;
        if !ctx.backend.is_terminated() {
            open_ends.push(ctx.current_block()?);
        }
        if let (Some(else_block), Some(else_body)) = (else_block, s.else_body) {
            ctx.position_at(else_block)?;
            Self::emit_nested(ctx, else_body)?;
            if !ctx.backend.is_terminated() {
                open_ends.push(ctx.current_block()?);
            }
        }

        // With both arms terminated there is nothing to merge into and the
        // insertion point stays on a terminated block.
        if merge.is_none() && !open_ends.is_empty() {
            merge = Some(ctx.new_block("if.merge")?);
        }
        if let Some(merge) = merge {
            for end in open_ends {
                ctx.position_at(end)?;
                ctx.backend.create_br(merge)?;
            }
            ctx.position_at(merge)?;
        }
        Ok(())
    }

    fn emit_while<B: Backend>(ctx: &mut CodegenContext<'_, B>, s: &WhileStmt) -> CodegenResult<()> {
        let cond_block = ctx.new_block("while.cond")?;
        let body_block = ctx.new_block("while.body")?;
        let after_block = ctx.new_block("while.after")?;
        ctx.backend.create_br(cond_block)?;

        ctx.position_at(cond_block)?;
        let cond = Self::emit_test(ctx, &s.test)?;
        ctx.backend.create_cond_br(cond, body_block, after_block)?;

        ctx.position_at(body_block)?;
        ctx.with_target(JumpTarget::loop_target(after_block, cond_block), |ctx| {
            Self::emit_nested(ctx, s.body)
        })?;
        ctx.branch_if_open(cond_block)?;

        ctx.position_at(after_block)
    }

    fn emit_for<B: Backend>(ctx: &mut CodegenContext<'_, B>, s: &ForStmt) -> CodegenResult<()> {
        let init = ExprEmitter::emit_effect(ctx, &s.init);
        ctx.recover(init)?;

        let cond_block = ctx.new_block("for.cond")?;
        let body_block = ctx.new_block("for.body")?;
        let step_block = ctx.new_block("for.step")?;
        let after_block = ctx.new_block("for.after")?;
        ctx.backend.create_br(cond_block)?;

        ctx.position_at(cond_block)?;
        if s.test.is_empty() {
            ctx.backend.create_br(body_block)?;
        } else {
            let cond = Self::emit_test(ctx, &s.test)?;
            ctx.backend.create_cond_br(cond, body_block, after_block)?;
        }

        ctx.position_at(body_block)?;
        ctx.with_target(JumpTarget::loop_target(after_block, step_block), |ctx| {
            Self::emit_nested(ctx, s.body)
        })?;
        ctx.branch_if_open(step_block)?;

        ctx.position_at(step_block)?;
        let step = ExprEmitter::emit_effect(ctx, &s.step);
        ctx.recover(step)?;
        ctx.backend.create_br(cond_block)?;

        ctx.position_at(after_block)
    }

    /// Lower a switch to a chain of equality tests.
    ///
    /// Each case body falls through into the next case (the last one into
    /// `default`, then `after`) unless it ends in a terminator.
    fn emit_switch<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        s: &SwitchStmt,
    ) -> CodegenResult<()> {
        let ast = ctx.ast;
        let scrutinee = ExprEmitter::emit(ctx, &s.expr);
        let (scrutinee, scrutinee_ty) = ctx
            .recover(scrutinee)?
            .unwrap_or((Value::Const(Constant::Int(0)), IrType::I32));

        let mut arms = Vec::with_capacity(s.cases.len());
        for &case_id in &s.cases {
            ctx.mark_stmt_emitted(case_id)?;
            match ast.stmt(case_id) {
                Stmt::Case(case) => arms.push((case, ctx.new_block("switch.case")?)),
                other => {
                    return Err(CodegenError::internal(format!(
                        "switch arm is a {}",
                        other.kind_name()
                    )));
                }
            }
        }
        let default = match s.default {
            Some(default_id) => {
                ctx.mark_stmt_emitted(default_id)?;
                match ast.stmt(default_id) {
                    Stmt::Default(default) => Some((default, ctx.new_block("switch.default")?)),
                    other => {
                        return Err(CodegenError::internal(format!(
                            "switch default is a {}",
                            other.kind_name()
                        )));
                    }
                }
            }
            None => None,
        };
        let after_block = ctx.new_block("switch.after")?;
        let no_match = default.map_or(after_block, |(_, block)| block);

        // Test chain: compare against each label in source order. The first
        // test runs in the current block.
        let mut test_blocks = Vec::with_capacity(arms.len().saturating_sub(1));
        for _ in 1..arms.len() {
            test_blocks.push(ctx.new_block("switch.test")?);
        }
        let mut seen: IndexMap<i64, TextRange> = IndexMap::new();
        for (index, (case, case_block)) in arms.iter().enumerate() {
            if index > 0 {
                ctx.position_at(test_blocks[index - 1])?;
            }
            let matched =
                Self::emit_case_test(ctx, &case.label, scrutinee, scrutinee_ty, &mut seen);
            let matched = ctx
                .recover(matched)?
                .unwrap_or(Value::Const(Constant::Bool(false)));
            let no_match_here = test_blocks.get(index).copied().unwrap_or(no_match);
            ctx.backend.create_cond_br(matched, *case_block, no_match_here)?;
        }
        if arms.is_empty() {
            ctx.backend.create_br(no_match)?;
        }

        // Bodies share one scope, as in a single C block.
        ctx.with_target(JumpTarget::switch_target(after_block), |ctx| {
            ctx.with_scope(ScopeKind::Block, |ctx| {
                for (index, (case, case_block)) in arms.iter().enumerate() {
                    let fallthrough = arms
                        .get(index + 1)
                        .map_or(no_match, |(_, next_block)| *next_block);
                    ctx.position_at(*case_block)?;
                    Self::emit_sequence(ctx, &case.body)?;
                    ctx.branch_if_open(fallthrough)?;
                }
                if let Some((default, default_block)) = default {
                    ctx.position_at(default_block)?;
                    Self::emit_sequence(ctx, &default.body)?;
                    ctx.branch_if_open(after_block)?;
                }
                Ok(())
            })
        })?;

        ctx.position_at(after_block)
    }

    /// Compare the scrutinee against one case label.
    fn emit_case_test<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        label: &Expr,
        scrutinee: Value,
        scrutinee_ty: IrType,
        seen: &mut IndexMap<i64, TextRange>,
    ) -> CodegenResult<Value> {
        let value = match ConstEvaluator::fold(ctx, label) {
            Some(c) => {
                if c.ty() != scrutinee_ty {
                    return Err(CodegenError::TypeMismatch {
                        expected: scrutinee_ty,
                        found: c.ty(),
                        span: label.span,
                    });
                }
                if let Some(key) = c.as_int() {
                    if let Some(&previous) = seen.get(&key) {
                        return Err(CodegenError::DuplicateCaseLabel {
                            value: key,
                            span: label.span,
                            previous,
                        });
                    }
                    seen.insert(key, label.span);
                }
                Value::Const(c)
            }
            None => ExprEmitter::emit_as(ctx, label, scrutinee_ty)?,
        };
        ctx.backend.create_compare(CmpPred::Eq, scrutinee, value)
    }

    fn emit_return<B: Backend>(ctx: &mut CodegenContext<'_, B>, s: &ReturnStmt) -> CodegenResult<()> {
        let return_ty = ctx.current_function()?.return_ty;
        match (&s.value, return_ty) {
            (Some(value), IrType::Void) => {
                let found = ExprEmitter::infer_type(ctx, value)?;
                Err(CodegenError::TypeMismatch {
                    expected: IrType::Void,
                    found,
                    span: value.span,
                })
            }
            (Some(value), ty) => {
                let value = ExprEmitter::emit_as(ctx, value, ty)?;
                ctx.backend.create_ret(Some(value))
            }
            (None, IrType::Void) => ctx.backend.create_ret(None),
            (None, ty) => Err(CodegenError::TypeMismatch {
                expected: ty,
                found: IrType::Void,
                span: s.span,
            }),
        }
    }
}
