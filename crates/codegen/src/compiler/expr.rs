//! Expression lowering to IR values

use crate::backend::Backend;
use crate::compiler::const_eval::ConstEvaluator;
use crate::compiler::context::CodegenContext;
use crate::error::{CodegenError, CodegenResult};
use crate::ir::{BinOp, CmpPred, Constant, IrType, UnOp, Value};
use crate::symbol::{DeclAssoc, StorageHandle};
use glint_ast::{
    AssignOp, BinaryOp, ComparisonOp, Expr, ExprKind, Identifier, LogicalOp, UnaryOp,
};
use text_size::TextRange;

pub struct ExprEmitter;

impl ExprEmitter {
    /// Emit `expr` at the insertion point, returning its value and type.
    pub fn emit<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        expr: &Expr,
    ) -> CodegenResult<(Value, IrType)> {
        match &expr.kind {
            ExprKind::Empty => Err(CodegenError::internal("empty expression used as a value")),
            ExprKind::Literal(lit) => {
                let c = ConstEvaluator::literal(*lit);
                Ok((Value::Const(c), c.ty()))
            }
            ExprKind::Var(ident) => {
                let (address, ty) = Self::address_of(ctx, ident)?;
                let value = ctx.backend.create_load(ty, address, ident.as_str())?;
                Ok((value, ty))
            }
            ExprKind::Assign { target, op, value } => {
                Self::emit_assign(ctx, target, *op, value, expr.span)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let (l, lt) = Self::emit(ctx, lhs)?;
                let (r, rt) = Self::emit(ctx, rhs)?;
                expect_type(lt, rt, rhs.span)?;
                if !lt.is_numeric() {
                    return Err(CodegenError::TypeMismatch {
                        expected: IrType::I32,
                        found: lt,
                        span: lhs.span,
                    });
                }
                let value = ctx.backend.create_binary(binary_op(*op), lt, l, r)?;
                Ok((value, lt))
            }
            ExprKind::Compare { op, lhs, rhs } => {
                let (l, lt) = Self::emit(ctx, lhs)?;
                let (r, rt) = Self::emit(ctx, rhs)?;
                expect_type(lt, rt, rhs.span)?;
                let equality = matches!(op, ComparisonOp::Eq | ComparisonOp::NotEq);
                if !(lt.is_numeric() || (equality && lt == IrType::I1)) {
                    return Err(CodegenError::TypeMismatch {
                        expected: IrType::I32,
                        found: lt,
                        span: lhs.span,
                    });
                }
                let value = ctx.backend.create_compare(compare_pred(*op), l, r)?;
                Ok((value, IrType::I1))
            }
            ExprKind::Logical { op, lhs, rhs } => Self::emit_logical(ctx, *op, lhs, rhs),
            ExprKind::Unary { op, operand } => {
                let (v, ty) = Self::emit(ctx, operand)?;
                match (op, ty) {
                    (UnaryOp::Neg, IrType::I32 | IrType::F32) => {
                        Ok((ctx.backend.create_unary(UnOp::Neg, ty, v)?, ty))
                    }
                    (UnaryOp::Not, IrType::I1) => {
                        Ok((ctx.backend.create_unary(UnOp::Not, ty, v)?, ty))
                    }
                    (UnaryOp::Not, IrType::I32 | IrType::F32) => {
                        let zero = Value::Const(Constant::null(ty));
                        Ok((ctx.backend.create_compare(CmpPred::Eq, v, zero)?, IrType::I1))
                    }
                    _ => Err(CodegenError::TypeMismatch {
                        expected: IrType::I32,
                        found: ty,
                        span: operand.span,
                    }),
                }
            }
            ExprKind::Call { callee, args } => Self::emit_call(ctx, callee, args, expr.span),
        }
    }

    /// Emit `expr` and check that it has type `expected`.
    pub fn emit_as<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        expr: &Expr,
        expected: IrType,
    ) -> CodegenResult<Value> {
        let (value, ty) = Self::emit(ctx, expr)?;
        expect_type(expected, ty, expr.span)?;
        Ok(value)
    }

    /// Emit `expr` for its side effects; an empty expression emits nothing.
    pub fn emit_effect<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        expr: &Expr,
    ) -> CodegenResult<()> {
        if !expr.is_empty() {
            Self::emit(ctx, expr)?;
        }
        Ok(())
    }

    /// Emit `expr` as a branch condition (`i1`). Numeric values are compared
    /// against zero.
    pub fn emit_condition<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        expr: &Expr,
    ) -> CodegenResult<Value> {
        let (value, ty) = Self::emit(ctx, expr)?;
        match ty {
            IrType::I1 => Ok(value),
            IrType::I32 | IrType::F32 => {
                let zero = Value::Const(Constant::null(ty));
                ctx.backend.create_compare(CmpPred::Ne, value, zero)
            }
            _ => Err(CodegenError::TypeMismatch {
                expected: IrType::I1,
                found: ty,
                span: expr.span,
            }),
        }
    }

    /// The type `expr` would have, without emitting anything.
    pub fn infer_type<B: Backend>(
        ctx: &CodegenContext<'_, B>,
        expr: &Expr,
    ) -> CodegenResult<IrType> {
        match &expr.kind {
            ExprKind::Empty => Ok(IrType::Void),
            ExprKind::Literal(lit) => Ok(ConstEvaluator::literal(*lit).ty()),
            ExprKind::Var(ident) | ExprKind::Assign { target: ident, .. } => {
                let assoc = Self::resolve(ctx, ident)?;
                match assoc.storage {
                    StorageHandle::Function(_) => Err(CodegenError::NotAValue {
                        name: ident.name.clone(),
                        span: ident.span,
                    }),
                    _ => Ok(assoc.ty),
                }
            }
            ExprKind::Binary { lhs, .. } => Self::infer_type(ctx, lhs),
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => Self::infer_type(ctx, operand),
            ExprKind::Compare { .. }
            | ExprKind::Logical { .. }
            | ExprKind::Unary {
                op: UnaryOp::Not, ..
            } => Ok(IrType::I1),
            ExprKind::Call { callee, .. } => {
                let assoc = Self::resolve(ctx, callee)?;
                match assoc.storage {
                    StorageHandle::Function(_) => Ok(assoc.ty),
                    _ => Err(CodegenError::NotCallable {
                        name: callee.name.clone(),
                        span: callee.span,
                    }),
                }
            }
        }
    }

    fn resolve<B: Backend>(
        ctx: &CodegenContext<'_, B>,
        ident: &Identifier,
    ) -> CodegenResult<DeclAssoc> {
        ctx.scopes
            .resolve(ident.as_str())
            .copied()
            .ok_or_else(|| CodegenError::UndeclaredIdentifier {
                name: ident.name.clone(),
                span: ident.span,
            })
    }

    /// Storage address and value type of a variable.
    fn address_of<B: Backend>(
        ctx: &CodegenContext<'_, B>,
        ident: &Identifier,
    ) -> CodegenResult<(Value, IrType)> {
        let assoc = Self::resolve(ctx, ident)?;
        match assoc.storage {
            StorageHandle::Global(global) => Ok((Value::Global(global), assoc.ty)),
            StorageHandle::Slot { func, ptr } => {
                if ctx.function.is_some_and(|f| f.func != func) {
                    return Err(CodegenError::EnclosingLocal {
                        name: ident.name.clone(),
                        span: ident.span,
                    });
                }
                Ok((ptr, assoc.ty))
            }
            StorageHandle::Function(_) => Err(CodegenError::NotAValue {
                name: ident.name.clone(),
                span: ident.span,
            }),
        }
    }

    fn emit_assign<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        target: &Identifier,
        op: AssignOp,
        value: &Expr,
        span: TextRange,
    ) -> CodegenResult<(Value, IrType)> {
        let (address, ty) = Self::address_of(ctx, target)?;
        let result = match op.binary_op() {
            None => Self::emit_as(ctx, value, ty)?,
            Some(arith) => {
                if !ty.is_numeric() {
                    return Err(CodegenError::TypeMismatch {
                        expected: IrType::I32,
                        found: ty,
                        span,
                    });
                }
                let current = ctx.backend.create_load(ty, address, target.as_str())?;
                let rhs = Self::emit_as(ctx, value, ty)?;
                ctx.backend.create_binary(binary_op(arith), ty, current, rhs)?
            }
        };
        ctx.backend.create_store(result, address)?;
        Ok((result, ty))
    }

    /// Short-circuit `&&`/`||` through `logic.rhs` and a joining `phi`.
    fn emit_logical<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        op: LogicalOp,
        lhs: &Expr,
        rhs: &Expr,
    ) -> CodegenResult<(Value, IrType)> {
        let l = Self::emit_condition(ctx, lhs)?;
        let lhs_end = ctx.current_block()?;
        let rhs_block = ctx.new_block("logic.rhs")?;
        let end_block = ctx.new_block("logic.end")?;
        match op {
            LogicalOp::And => ctx.backend.create_cond_br(l, rhs_block, end_block)?,
            LogicalOp::Or => ctx.backend.create_cond_br(l, end_block, rhs_block)?,
        }

        ctx.position_at(rhs_block)?;
        let r = Self::emit_condition(ctx, rhs)?;
        let rhs_end = ctx.current_block()?;
        ctx.backend.create_br(end_block)?;

        ctx.position_at(end_block)?;
        let short_circuit = Value::Const(Constant::Bool(op == LogicalOp::Or));
        let value = ctx
            .backend
            .create_phi(IrType::I1, vec![(short_circuit, lhs_end), (r, rhs_end)])?;
        Ok((value, IrType::I1))
    }

    fn emit_call<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        callee: &Identifier,
        args: &[Expr],
        span: TextRange,
    ) -> CodegenResult<(Value, IrType)> {
        let assoc = Self::resolve(ctx, callee)?;
        let StorageHandle::Function(func) = assoc.storage else {
            return Err(CodegenError::NotCallable {
                name: callee.name.clone(),
                span: callee.span,
            });
        };
        let signature = ctx.backend.function_signature(func).clone();
        if signature.params.len() != args.len() {
            return Err(CodegenError::ArgumentCountMismatch {
                name: callee.name.clone(),
                expected: signature.params.len(),
                found: args.len(),
                span,
            });
        }
        let mut values = Vec::with_capacity(args.len());
        for (arg, &ty) in args.iter().zip(&signature.params) {
            values.push(Self::emit_as(ctx, arg, ty)?);
        }
        let value = ctx.backend.create_call(func, values)?;
        Ok((value, signature.ret))
    }
}

fn expect_type(expected: IrType, found: IrType, span: TextRange) -> CodegenResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(CodegenError::TypeMismatch {
            expected,
            found,
            span,
        })
    }
}

fn binary_op(op: BinaryOp) -> BinOp {
    match op {
        BinaryOp::Add => BinOp::Add,
        BinaryOp::Sub => BinOp::Sub,
        BinaryOp::Mul => BinOp::Mul,
        BinaryOp::Div => BinOp::Div,
        BinaryOp::Mod => BinOp::Rem,
    }
}

fn compare_pred(op: ComparisonOp) -> CmpPred {
    match op {
        ComparisonOp::Eq => CmpPred::Eq,
        ComparisonOp::NotEq => CmpPred::Ne,
        ComparisonOp::Lt => CmpPred::Lt,
        ComparisonOp::LtE => CmpPred::Le,
        ComparisonOp::Gt => CmpPred::Gt,
        ComparisonOp::GtE => CmpPred::Ge,
    }
}
