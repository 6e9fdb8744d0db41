//! Glint AST: the typed syntax tree handed from the front end to code generation.
//!
//! - Declarations and statements live in an index [`Ast`] arena with owning
//!   indices downward and non-owning parent links upward
//! - Expressions are small owned trees
//! - Every node carries a [`TextRange`] for diagnostics
//!
//! ```
//! use glint_ast::{Ast, Expr, Identifier, Type};
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
//! assert_eq!(ast.decl(program.decls[0]).name(), "g");
//! ```

pub mod arena;
pub mod ast;
pub mod error;

pub use arena::Ast;
pub use ast::{
    AssignOp, BinaryOp, ComparisonOp, Decl, DeclId, Expr, ExprKind, FnDecl, FnKind, Identifier,
    Literal, LogicalOp, NodeRef, Program, QualifierKind, Stmt, StmtId, Type, TypeQualifier,
    UnaryOp, VarDecl,
};
pub use error::{Diagnostic, DiagnosticCollector, ErrorCode, Severity};
pub use text_size::{TextRange, TextSize};
