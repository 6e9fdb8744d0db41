//! Compiler orchestration
//!
//! Walks the AST once, in source order, emitting IR through a [`Backend`](crate::backend::Backend).

pub mod const_eval;
pub mod context;
pub mod decl;
pub mod expr;
pub mod module;
pub mod stmt;
pub mod targets;
