//! Abstract Syntax Tree (AST) definition.

pub mod expr;
pub mod node_id;
pub mod nodes;
pub mod ops;
pub mod types;

// Re-export commonly used types
pub use expr::{Expr, ExprKind, Literal};
pub use node_id::{DeclId, NodeRef, StmtId};
pub use nodes::*;
pub use ops::{AssignOp, BinaryOp, ComparisonOp, LogicalOp, UnaryOp};
pub use types::{Identifier, QualifierKind, Type, TypeQualifier};
