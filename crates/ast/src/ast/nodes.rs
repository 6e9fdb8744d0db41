//! Core AST node definitions (declarations and statements).
//!
//! Declarations and statements are stored in an [`Ast`](crate::Ast) arena and
//! refer to their children through [`DeclId`]/[`StmtId`] indices.

use super::expr::Expr;
use super::node_id::{DeclId, StmtId};
use super::types::{Identifier, Type, TypeQualifier};
use text_size::TextRange;

/// The root of a translation unit.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub decls: Vec<DeclId>,
}

/// Declaration types.
#[derive(Debug, Clone)]
pub enum Decl {
    Var(VarDecl),
    Fn(FnDecl),
}

impl Decl {
    pub fn ident(&self) -> &Identifier {
        match self {
            Decl::Var(d) => &d.ident,
            Decl::Fn(d) => &d.ident,
        }
    }

    pub fn name(&self) -> &str {
        self.ident().as_str()
    }

    pub fn span(&self) -> TextRange {
        match self {
            Decl::Var(d) => d.span,
            Decl::Fn(d) => d.span,
        }
    }

    pub fn as_var(&self) -> Option<&VarDecl> {
        match self {
            Decl::Var(d) => Some(d),
            Decl::Fn(_) => None,
        }
    }

    pub fn as_fn(&self) -> Option<&FnDecl> {
        match self {
            Decl::Fn(d) => Some(d),
            Decl::Var(_) => None,
        }
    }
}

/// A variable declaration: `const int x = 4;`
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ident: Identifier,
    pub ty: Option<Type>,
    pub qualifier: Option<TypeQualifier>,
    pub init: Option<Expr>,
    pub span: TextRange,
}

impl VarDecl {
    /// Build a variable declaration.
    ///
    /// # Panics
    ///
    /// Panics when neither a type nor a qualifier is given; the parser must
    /// never produce such a declaration.
    pub fn new(
        ident: Identifier,
        ty: Option<Type>,
        qualifier: Option<TypeQualifier>,
        init: Option<Expr>,
    ) -> Self {
        assert!(
            ty.is_some() || qualifier.is_some(),
            "variable `{}` declared without a type or qualifier",
            ident
        );
        let mut span = ident.span;
        if let Some(q) = &qualifier {
            span = span.cover(q.span);
        }
        if let Some(init) = &init {
            span = span.cover(init.span);
        }
        Self {
            ident,
            ty,
            qualifier,
            init,
            span,
        }
    }

    pub fn is_const(&self) -> bool {
        self.qualifier.is_some_and(|q| q.is_const())
    }
}

/// Whether a function declaration carries a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnKind {
    /// A full definition; its body is bound after construction.
    Definition,
    /// A forward declaration without a body.
    Prototype,
}

/// A function declaration.
#[derive(Debug, Clone)]
pub struct FnDecl {
    pub ident: Identifier,
    pub return_type: Type,
    pub return_qualifier: Option<TypeQualifier>,
    /// Formal parameters, each a [`Decl::Var`].
    pub formals: Vec<DeclId>,
    pub body: Option<StmtId>,
    pub kind: FnKind,
    pub span: TextRange,
}

impl FnDecl {
    pub fn is_prototype(&self) -> bool {
        self.kind == FnKind::Prototype
    }
}

/// Statement types.
#[derive(Debug, Clone)]
pub enum Stmt {
    Block(StmtBlock),
    Expr(ExprStmt),
    Decl(DeclStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Switch(SwitchStmt),
    Case(CaseStmt),
    Default(DefaultStmt),
    Break(TextRange),
    Continue(TextRange),
    Return(ReturnStmt),
}

impl Stmt {
    pub fn span(&self) -> TextRange {
        match self {
            Stmt::Block(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::Decl(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Case(s) => s.span,
            Stmt::Default(s) => s.span,
            Stmt::Break(s) | Stmt::Continue(s) => *s,
            Stmt::Return(s) => s.span,
        }
    }

    /// Loop statements (`while`, `for`) define a `continue` target.
    pub fn is_loop(&self) -> bool {
        matches!(self, Stmt::While(_) | Stmt::For(_))
    }

    /// The test expression of a conditional statement (`if`, `while`, `for`).
    pub fn test(&self) -> Option<&Expr> {
        match self {
            Stmt::If(s) => Some(&s.test),
            Stmt::While(s) => Some(&s.test),
            Stmt::For(s) => Some(&s.test),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Block(_) => "StmtBlock",
            Stmt::Expr(_) => "ExprStmt",
            Stmt::Decl(_) => "DeclStmt",
            Stmt::If(_) => "IfStmt",
            Stmt::While(_) => "WhileStmt",
            Stmt::For(_) => "ForStmt",
            Stmt::Switch(_) => "SwitchStmt",
            Stmt::Case(_) => "Case",
            Stmt::Default(_) => "Default",
            Stmt::Break(_) => "BreakStmt",
            Stmt::Continue(_) => "ContinueStmt",
            Stmt::Return(_) => "ReturnStmt",
        }
    }
}

/// `{ decls...; stmts... }`, one lexical scope.
#[derive(Debug, Clone)]
pub struct StmtBlock {
    pub decls: Vec<DeclId>,
    pub stmts: Vec<StmtId>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: TextRange,
}

/// A declaration appearing in statement position.
#[derive(Debug, Clone)]
pub struct DeclStmt {
    pub decl: DeclId,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub test: Expr,
    pub then_body: StmtId,
    pub else_body: Option<StmtId>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub test: Expr,
    pub body: StmtId,
    pub span: TextRange,
}

/// `for (init; test; step) body`; absent clauses are [`ExprKind::Empty`](super::ExprKind::Empty).
#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Expr,
    pub test: Expr,
    pub step: Expr,
    pub body: StmtId,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub expr: Expr,
    /// [`Stmt::Case`] nodes in source order.
    pub cases: Vec<StmtId>,
    /// An optional [`Stmt::Default`] node, reached when no case matches.
    pub default: Option<StmtId>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct CaseStmt {
    pub label: Expr,
    pub body: Vec<StmtId>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct DefaultStmt {
    pub body: Vec<StmtId>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: TextRange,
}
