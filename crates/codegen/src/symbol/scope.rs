// Lexical scope tracking

use crate::ir::{FuncId, GlobalId, IrType, Value};
use glint_ast::DeclId;
use indexmap::IndexMap;
use text_size::TextRange;

/// The kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Module/global scope (bottom of the stack)
    Module,
    /// Formal parameters and the outermost body block of a function
    Function,
    /// Nested statement block
    Block,
}

/// Where the value of a declaration lives after emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StorageHandle {
    /// Module-level global
    Global(GlobalId),
    /// Stack slot created by an `alloca` in `func`
    Slot { func: FuncId, ptr: Value },
    /// A function
    Function(FuncId),
}

/// Association between a declaration and its emitted storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclAssoc {
    /// The declaration this entry was created for
    pub decl: DeclId,
    pub storage: StorageHandle,
    /// Type of the stored value (return type for functions)
    pub ty: IrType,
    /// Whether the entry was inserted into the module scope
    pub is_global: bool,
    /// Where the declaration was written
    pub span: TextRange,
}

/// A lexical scope: name bindings in declaration order.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    symbols: IndexMap<String, DeclAssoc>,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            symbols: IndexMap::new(),
        }
    }

    /// Look up a name in this scope only.
    pub fn lookup(&self, name: &str) -> Option<&DeclAssoc> {
        self.symbols.get(name)
    }

    /// Bind `name`, returning the existing entry instead when the name is taken.
    pub fn insert(&mut self, name: &str, assoc: DeclAssoc) -> Result<(), DeclAssoc> {
        if let Some(existing) = self.symbols.get(name) {
            return Err(*existing);
        }
        self.symbols.insert(name.to_string(), assoc);
        Ok(())
    }

    /// Overwrite an existing binding in place, keeping its position.
    pub fn replace(&mut self, name: &str, assoc: DeclAssoc) -> Option<DeclAssoc> {
        self.symbols.get_mut(name).map(|slot| std::mem::replace(slot, assoc))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Bound names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }
}
