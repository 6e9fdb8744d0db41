//! Node identification for arena-allocated AST nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a declaration node in an [`Ast`](crate::Ast) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclId(u32);

/// Index of a statement node in an [`Ast`](crate::Ast) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StmtId(u32);

macro_rules! arena_index {
    ($($ty:ident => $label:literal),*) => {
        $(
            impl $ty {
                /// Create an ID from a raw arena index.
                pub fn new(index: usize) -> Self {
                    assert!(index < u32::MAX as usize, "AST arena exhausted");
                    $ty(index as u32)
                }

                /// Get the underlying arena index.
                pub fn index(self) -> usize {
                    self.0 as usize
                }

                /// Get the underlying ID value.
                pub fn as_u32(self) -> u32 {
                    self.0
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!($label, "({})"), self.0)
                }
            }
        )*
    };
}

arena_index!(DeclId => "Decl", StmtId => "Stmt");

/// Non-owning reference to any arena node, used for parent links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Decl(DeclId),
    Stmt(StmtId),
}

impl From<DeclId> for NodeRef {
    fn from(id: DeclId) -> Self {
        NodeRef::Decl(id)
    }
}

impl From<StmtId> for NodeRef {
    fn from(id: StmtId) -> Self {
        NodeRef::Stmt(id)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Decl(id) => id.fmt(f),
            NodeRef::Stmt(id) => id.fmt(f),
        }
    }
}
