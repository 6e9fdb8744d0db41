//! Scoped symbol table mapping names to emitted storage.

pub mod scope;
pub mod table;

pub use scope::{DeclAssoc, Scope, ScopeKind, StorageHandle};
pub use table::ScopeStack;
