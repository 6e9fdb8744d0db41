use super::scope::{DeclAssoc, Scope, ScopeKind, StorageHandle};
use crate::error::{CodegenError, CodegenResult};
use crate::ir::{FuncId, IrType};
use glint_ast::DeclId;
use log::debug;
use text_size::TextRange;

/// Stack of lexical scopes, innermost last.
///
/// The module scope sits at index 0 for the lifetime of the stack. Whether a
/// new binding is global is decided by the depth of the stack at insertion
/// time, never by the contents of the scopes.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// Create a stack holding only the module scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Module)],
        }
    }

    /// Enter a new scope
    pub fn push_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
        debug!("push {:?} scope (depth {})", kind, self.depth());
    }

    /// Exit the current scope
    pub fn pop_scope(&mut self) -> CodegenResult<Scope> {
        if self.scopes.len() == 1 {
            return Err(CodegenError::internal("attempted to pop the module scope"));
        }
        let scope = self
            .scopes
            .pop()
            .ok_or_else(|| CodegenError::internal("scope stack is empty"))?;
        debug!(
            "pop {:?} scope with {} binding(s) (depth {})",
            scope.kind,
            scope.len(),
            self.depth()
        );
        Ok(scope)
    }

    /// Bind `name` in the innermost scope.
    pub fn declare(
        &mut self,
        name: &str,
        decl: DeclId,
        storage: StorageHandle,
        ty: IrType,
        span: TextRange,
    ) -> CodegenResult<DeclAssoc> {
        let assoc = DeclAssoc {
            decl,
            storage,
            ty,
            is_global: self.is_global_scope(),
            span,
        };
        self.top_mut()
            .insert(name, assoc)
            .map_err(|previous| Self::duplicate(name, span, &previous))?;
        Ok(assoc)
    }

    /// Fail when `name` is already bound in the innermost scope.
    ///
    /// Lets callers reject a redeclaration before emitting storage for it.
    pub fn ensure_undeclared(&self, name: &str, span: TextRange) -> CodegenResult<()> {
        match self.lookup_local(name) {
            Some(previous) => Err(Self::duplicate(name, span, previous)),
            None => Ok(()),
        }
    }

    /// The function bound to `name` in the innermost scope, if any. Any other
    /// binding there makes `name` a duplicate.
    pub fn local_function(&self, name: &str, span: TextRange) -> CodegenResult<Option<FuncId>> {
        match self.lookup_local(name) {
            None => Ok(None),
            Some(DeclAssoc {
                storage: StorageHandle::Function(func),
                ..
            }) => Ok(Some(*func)),
            Some(previous) => Err(Self::duplicate(name, span, previous)),
        }
    }

    fn duplicate(name: &str, span: TextRange, previous: &DeclAssoc) -> CodegenError {
        CodegenError::DuplicateDeclaration {
            name: name.to_string(),
            span,
            previous: previous.span,
        }
    }

    /// Bind a function definition, taking over the entry of its own
    /// prototype when one exists in the innermost scope.
    pub fn redeclare_function(
        &mut self,
        name: &str,
        decl: DeclId,
        storage: StorageHandle,
        ty: IrType,
        span: TextRange,
    ) -> CodegenResult<DeclAssoc> {
        match self.lookup_local(name).copied() {
            Some(existing) if existing.storage == storage => {
                let assoc = DeclAssoc {
                    decl,
                    span,
                    ..existing
                };
                self.top_mut().replace(name, assoc);
                Ok(assoc)
            }
            _ => self.declare(name, decl, storage, ty, span),
        }
    }

    /// Resolve a name, innermost scope first.
    pub fn resolve(&self, name: &str) -> Option<&DeclAssoc> {
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name))
    }

    /// Look up a name in the innermost scope only.
    pub fn lookup_local(&self, name: &str) -> Option<&DeclAssoc> {
        self.scopes.last().and_then(|scope| scope.lookup(name))
    }

    /// True while only the module scope is on the stack.
    pub fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The innermost scope
    pub fn current(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Scope {
        let top = self.scopes.len() - 1;
        &mut self.scopes[top]
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{GlobalId, InstId, Value};

    fn span(start: u32) -> TextRange {
        TextRange::new(start.into(), (start + 1).into())
    }

    fn slot(n: u32) -> StorageHandle {
        StorageHandle::Slot {
            func: FuncId(0),
            ptr: Value::Inst(InstId(n)),
        }
    }

    #[test]
    fn test_global_flag_follows_depth() {
        let mut scopes = ScopeStack::new();
        let g = scopes
            .declare("g", DeclId::new(0), StorageHandle::Global(GlobalId(0)), IrType::I32, span(0))
            .unwrap();
        scopes.push_scope(ScopeKind::Function);
        let x = scopes.declare("x", DeclId::new(1), slot(0), IrType::I32, span(4)).unwrap();

        assert!(g.is_global);
        assert!(!x.is_global);
        assert_eq!(scopes.depth(), 2);
    }

    #[test]
    fn test_shadowing_resolves_innermost() {
        let mut scopes = ScopeStack::new();
        scopes.push_scope(ScopeKind::Function);
        scopes.declare("x", DeclId::new(0), slot(0), IrType::I32, span(0)).unwrap();
        scopes.push_scope(ScopeKind::Block);
        scopes.declare("x", DeclId::new(1), slot(1), IrType::F32, span(8)).unwrap();

        assert_eq!(scopes.resolve("x").map(|a| a.decl), Some(DeclId::new(1)));
        scopes.pop_scope().unwrap();
        assert_eq!(scopes.resolve("x").map(|a| a.decl), Some(DeclId::new(0)));
        scopes.pop_scope().unwrap();
        assert!(scopes.resolve("x").is_none());
    }

    #[test]
    fn test_duplicate_in_same_scope_is_rejected() {
        let mut scopes = ScopeStack::new();
        scopes.push_scope(ScopeKind::Block);
        scopes.declare("x", DeclId::new(0), slot(0), IrType::I32, span(0)).unwrap();
        let err = scopes
            .declare("x", DeclId::new(1), slot(1), IrType::I32, span(6))
            .unwrap_err();

        assert_eq!(
            err,
            CodegenError::DuplicateDeclaration {
                name: "x".to_string(),
                span: span(6),
                previous: span(0),
            }
        );
        assert_eq!(scopes.resolve("x").map(|a| a.decl), Some(DeclId::new(0)));
    }

    #[test]
    fn test_module_scope_cannot_be_popped() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.pop_scope().unwrap_err().is_fatal());
        assert!(scopes.is_global_scope());
    }

    #[test]
    fn test_definition_replaces_its_prototype() {
        let mut scopes = ScopeStack::new();
        let f = StorageHandle::Function(FuncId(0));
        scopes.declare("f", DeclId::new(0), f, IrType::I32, span(0)).unwrap();
        let def = scopes
            .redeclare_function("f", DeclId::new(3), f, IrType::I32, span(20))
            .unwrap();

        assert_eq!(def.decl, DeclId::new(3));
        assert!(def.is_global);
        assert_eq!(scopes.current().len(), 1);
        let other = StorageHandle::Function(FuncId(1));
        assert!(
            scopes
                .redeclare_function("f", DeclId::new(4), other, IrType::I32, span(30))
                .is_err()
        );
    }

    #[test]
    fn test_lookup_local_ignores_outer_scopes() {
        let mut scopes = ScopeStack::new();
        scopes
            .declare("g", DeclId::new(0), StorageHandle::Global(GlobalId(0)), IrType::I32, span(0))
            .unwrap();
        scopes.push_scope(ScopeKind::Function);

        assert!(scopes.lookup_local("g").is_none());
        assert!(scopes.resolve("g").is_some());
    }

    #[test]
    fn test_local_function_only_sees_innermost_scope() {
        let mut scopes = ScopeStack::new();
        let f = StorageHandle::Function(FuncId(0));
        scopes.declare("f", DeclId::new(0), f, IrType::I32, span(0)).unwrap();
        scopes
            .declare("g", DeclId::new(1), StorageHandle::Global(GlobalId(0)), IrType::I32, span(4))
            .unwrap();

        assert_eq!(scopes.local_function("f", span(10)).unwrap(), Some(FuncId(0)));
        assert!(matches!(
            scopes.local_function("g", span(10)),
            Err(CodegenError::DuplicateDeclaration { .. })
        ));
        assert!(scopes.ensure_undeclared("f", span(10)).is_err());

        scopes.push_scope(ScopeKind::Block);
        assert_eq!(scopes.local_function("f", span(10)).unwrap(), None);
        assert!(scopes.ensure_undeclared("g", span(10)).is_ok());
    }
}
