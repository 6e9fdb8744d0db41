//! Compile-time folding of initializers and case labels.
//!
//! Integer arithmetic wraps at 32 bits like the emitted `i32` instructions.
//! Division by zero does not fold.

use crate::backend::Backend;
use crate::compiler::context::CodegenContext;
use crate::ir::{Constant, IrType};
use crate::symbol::StorageHandle;
use glint_ast::{BinaryOp, ComparisonOp, Expr, ExprKind, Literal, LogicalOp, UnaryOp};

pub struct ConstEvaluator;

impl ConstEvaluator {
    /// Fold `expr` to a constant, or `None` when it depends on runtime state.
    pub fn fold<B: Backend>(ctx: &CodegenContext<'_, B>, expr: &Expr) -> Option<Constant> {
        match &expr.kind {
            ExprKind::Literal(lit) => Some(Self::literal(*lit)),
            ExprKind::Var(ident) => match ctx.scopes.resolve(ident.as_str())?.storage {
                StorageHandle::Global(global) => ctx.backend.global_initializer(global),
                _ => None,
            },
            ExprKind::Unary { op, operand } => Self::unary(*op, Self::fold(ctx, operand)?),
            ExprKind::Binary { op, lhs, rhs } => {
                Self::binary(*op, Self::fold(ctx, lhs)?, Self::fold(ctx, rhs)?)
            }
            ExprKind::Compare { op, lhs, rhs } => {
                Self::compare(*op, Self::fold(ctx, lhs)?, Self::fold(ctx, rhs)?)
            }
            ExprKind::Logical { op, lhs, rhs } => {
                match (*op, Self::fold(ctx, lhs)?, Self::fold(ctx, rhs)?) {
                    (LogicalOp::And, Constant::Bool(a), Constant::Bool(b)) => {
                        Some(Constant::Bool(a && b))
                    }
                    (LogicalOp::Or, Constant::Bool(a), Constant::Bool(b)) => {
                        Some(Constant::Bool(a || b))
                    }
                    _ => None,
                }
            }
            ExprKind::Empty | ExprKind::Assign { .. } | ExprKind::Call { .. } => None,
        }
    }

    pub fn literal(lit: Literal) -> Constant {
        match lit {
            Literal::Int(v) => Constant::Int(wrap_i32(v)),
            Literal::Float(v) => Constant::Float(v as f32 as f64),
            Literal::Bool(b) => Constant::Bool(b),
        }
    }

    fn unary(op: UnaryOp, value: Constant) -> Option<Constant> {
        match (op, normalize(value)) {
            (UnaryOp::Neg, Constant::Int(v)) => Some(Constant::Int(wrap_i32(v.wrapping_neg()))),
            (UnaryOp::Neg, Constant::Float(v)) => Some(Constant::Float(-v)),
            (UnaryOp::Not, Constant::Bool(b)) => Some(Constant::Bool(!b)),
            (UnaryOp::Not, Constant::Int(v)) => Some(Constant::Bool(v == 0)),
            _ => None,
        }
    }

    fn binary(op: BinaryOp, lhs: Constant, rhs: Constant) -> Option<Constant> {
        match (normalize(lhs), normalize(rhs)) {
            (Constant::Int(a), Constant::Int(b)) => {
                let (a, b) = (a as i32, b as i32);
                let v = match op {
                    BinaryOp::Add => a.wrapping_add(b),
                    BinaryOp::Sub => a.wrapping_sub(b),
                    BinaryOp::Mul => a.wrapping_mul(b),
                    BinaryOp::Div => a.checked_div(b)?,
                    BinaryOp::Mod => a.checked_rem(b)?,
                };
                Some(Constant::Int(v as i64))
            }
            (Constant::Float(a), Constant::Float(b)) => {
                let v = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Mod => a % b,
                };
                Some(Constant::Float(v as f32 as f64))
            }
            _ => None,
        }
    }

    fn compare(op: ComparisonOp, lhs: Constant, rhs: Constant) -> Option<Constant> {
        let ordering = match (normalize(lhs), normalize(rhs)) {
            (Constant::Int(a), Constant::Int(b)) => a.partial_cmp(&b),
            (Constant::Float(a), Constant::Float(b)) => a.partial_cmp(&b),
            (Constant::Bool(a), Constant::Bool(b))
                if matches!(op, ComparisonOp::Eq | ComparisonOp::NotEq) =>
            {
                a.partial_cmp(&b)
            }
            _ => return None,
        };
        // NaN compares unequal to everything.
        let Some(ordering) = ordering else {
            return Some(Constant::Bool(op == ComparisonOp::NotEq));
        };
        let result = match op {
            ComparisonOp::Eq => ordering.is_eq(),
            ComparisonOp::NotEq => ordering.is_ne(),
            ComparisonOp::Lt => ordering.is_lt(),
            ComparisonOp::LtE => ordering.is_le(),
            ComparisonOp::Gt => ordering.is_gt(),
            ComparisonOp::GtE => ordering.is_ge(),
        };
        Some(Constant::Bool(result))
    }
}

fn wrap_i32(v: i64) -> i64 {
    v as i32 as i64
}

/// Replace `Zero` with the typed null so folding only sees concrete values.
fn normalize(value: Constant) -> Constant {
    match value {
        Constant::Zero(ty @ (IrType::I1 | IrType::I32 | IrType::F32)) => Constant::null(ty),
        other => other,
    }
}
