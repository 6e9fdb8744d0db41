//! Expression nodes.
//!
//! Expressions are small owned trees hanging off declarations and
//! statements; they never need parent links, so they live outside the arena.

use super::ops::{AssignOp, BinaryOp, ComparisonOp, LogicalOp, UnaryOp};
use super::types::Identifier;
use text_size::TextRange;

/// Literal values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// An expression with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: TextRange,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// The missing clause of `for (;;)`.
    Empty,
    Literal(Literal),
    Var(Identifier),
    Assign {
        target: Identifier,
        op: AssignOp,
        value: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Compare {
        op: ComparisonOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Identifier,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: TextRange) -> Self {
        Self { kind, span }
    }

    /// Replace the span, keeping the expression.
    pub fn at(mut self, span: TextRange) -> Self {
        self.span = span;
        self
    }

    pub fn empty() -> Self {
        Self::new(ExprKind::Empty, TextRange::default())
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::Literal(Literal::Int(value)), TextRange::default())
    }

    pub fn float(value: f64) -> Self {
        Self::new(ExprKind::Literal(Literal::Float(value)), TextRange::default())
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ExprKind::Literal(Literal::Bool(value)), TextRange::default())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::new(
            ExprKind::Var(Identifier::new(name, TextRange::default())),
            TextRange::default(),
        )
    }

    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Self::assign_op(target, AssignOp::Assign, value)
    }

    pub fn assign_op(target: impl Into<String>, op: AssignOp, value: Expr) -> Self {
        let span = value.span;
        Self::new(
            ExprKind::Assign {
                target: Identifier::new(target, span),
                op,
                value: Box::new(value),
            },
            span,
        )
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        let span = lhs.span.cover(rhs.span);
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    pub fn compare(op: ComparisonOp, lhs: Expr, rhs: Expr) -> Self {
        let span = lhs.span.cover(rhs.span);
        Self::new(
            ExprKind::Compare {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    pub fn logical(op: LogicalOp, lhs: Expr, rhs: Expr) -> Self {
        let span = lhs.span.cover(rhs.span);
        Self::new(
            ExprKind::Logical {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        let span = operand.span;
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(
            ExprKind::Call {
                callee: Identifier::new(callee, TextRange::default()),
                args,
            },
            TextRange::default(),
        )
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, ExprKind::Empty)
    }

    /// The literal value, if this expression is a bare literal.
    pub fn as_literal(&self) -> Option<Literal> {
        match self.kind {
            ExprKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}
