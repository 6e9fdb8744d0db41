//! Index arena owning every declaration and statement of a translation unit.
//!
//! Parents own their children through [`DeclId`]/[`StmtId`] indices; each
//! node also records a non-owning link back to its parent, which is only
//! consulted when building diagnostics. A node can be attached to at most
//! one parent.

use crate::ast::{
    CaseStmt, Decl, DeclId, DeclStmt, DefaultStmt, Expr, ExprStmt, FnDecl, FnKind, ForStmt,
    Identifier, IfStmt, NodeRef, Program, ReturnStmt, Stmt, StmtBlock, StmtId, SwitchStmt, Type,
    TypeQualifier, VarDecl, WhileStmt,
};
use text_size::TextRange;

#[derive(Debug, Clone)]
struct Slot<T> {
    node: T,
    parent: Option<NodeRef>,
}

/// Arena of AST nodes.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    decls: Vec<Slot<Decl>>,
    stmts: Vec<Slot<Stmt>>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a declaration by ID.
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()].node
    }

    /// Get a statement by ID.
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()].node
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    /// The node that owns `node`, if it has been attached.
    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        match node {
            NodeRef::Decl(id) => self.decls[id.index()].parent,
            NodeRef::Stmt(id) => self.stmts[id.index()].parent,
        }
    }

    /// The innermost function declaration lexically containing `node`.
    pub fn enclosing_function(&self, node: NodeRef) -> Option<DeclId> {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if let NodeRef::Decl(id) = parent
                && matches!(self.decl(id), Decl::Fn(_))
            {
                return Some(id);
            }
            current = self.parent(parent);
        }
        None
    }

    // ===== Declarations =====

    /// Allocate a variable declaration. See [`VarDecl::new`] for the
    /// construction contract.
    pub fn var_decl(
        &mut self,
        ident: Identifier,
        ty: Option<Type>,
        qualifier: Option<TypeQualifier>,
        init: Option<Expr>,
    ) -> DeclId {
        self.push_decl(Decl::Var(VarDecl::new(ident, ty, qualifier, init)))
    }

    /// Allocate a function definition. The body is bound later through
    /// [`Ast::set_function_body`].
    pub fn fn_decl(
        &mut self,
        ident: Identifier,
        return_type: Type,
        return_qualifier: Option<TypeQualifier>,
        formals: Vec<DeclId>,
        span: TextRange,
    ) -> DeclId {
        self.push_fn(ident, return_type, return_qualifier, formals, FnKind::Definition, span)
    }

    /// Allocate a function prototype (forward declaration).
    pub fn fn_prototype(
        &mut self,
        ident: Identifier,
        return_type: Type,
        formals: Vec<DeclId>,
        span: TextRange,
    ) -> DeclId {
        self.push_fn(ident, return_type, None, formals, FnKind::Prototype, span)
    }

    /// Bind the body of a function definition.
    ///
    /// # Panics
    ///
    /// Panics if `func` is not a function definition, already has a body, or
    /// `body` is not a statement block.
    pub fn set_function_body(&mut self, func: DeclId, body: StmtId) {
        assert!(
            matches!(self.stmt(body), Stmt::Block(_)),
            "function body must be a statement block"
        );
        self.attach(NodeRef::Stmt(body), func.into());
        match &mut self.decls[func.index()].node {
            Decl::Fn(f) => {
                assert!(f.kind == FnKind::Definition, "prototype `{}` cannot take a body", f.ident);
                assert!(f.body.is_none(), "function `{}` body bound twice", f.ident);
                f.body = Some(body);
            }
            Decl::Var(v) => panic!("`{}` is not a function", v.ident),
        }
    }

    fn push_fn(
        &mut self,
        ident: Identifier,
        return_type: Type,
        return_qualifier: Option<TypeQualifier>,
        formals: Vec<DeclId>,
        kind: FnKind,
        span: TextRange,
    ) -> DeclId {
        for &formal in &formals {
            assert!(
                matches!(self.decl(formal), Decl::Var(_)),
                "function formals must be variable declarations"
            );
        }
        let id = self.push_decl(Decl::Fn(FnDecl {
            ident,
            return_type,
            return_qualifier,
            formals: formals.clone(),
            body: None,
            kind,
            span,
        }));
        for formal in formals {
            self.attach(formal.into(), id.into());
        }
        id
    }

    fn push_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::new(self.decls.len());
        self.decls.push(Slot {
            node: decl,
            parent: None,
        });
        id
    }

    // ===== Statements =====

    /// Allocate a statement block owning `decls` and `stmts`.
    pub fn block(&mut self, decls: Vec<DeclId>, stmts: Vec<StmtId>, span: TextRange) -> StmtId {
        let id = self.push_stmt(Stmt::Block(StmtBlock {
            decls: decls.clone(),
            stmts: stmts.clone(),
            span,
        }));
        self.attach_all(decls.into_iter().map(NodeRef::from), id);
        self.attach_all(stmts.into_iter().map(NodeRef::from), id);
        id
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> StmtId {
        let span = expr.span;
        self.push_stmt(Stmt::Expr(ExprStmt { expr, span }))
    }

    pub fn decl_stmt(&mut self, decl: DeclId) -> StmtId {
        let span = self.decl(decl).span();
        let id = self.push_stmt(Stmt::Decl(DeclStmt { decl, span }));
        self.attach(decl.into(), id.into());
        id
    }

    pub fn if_stmt(
        &mut self,
        test: Expr,
        then_body: StmtId,
        else_body: Option<StmtId>,
        span: TextRange,
    ) -> StmtId {
        let id = self.push_stmt(Stmt::If(IfStmt {
            test,
            then_body,
            else_body,
            span,
        }));
        self.attach_all(
            std::iter::once(then_body).chain(else_body).map(NodeRef::from),
            id,
        );
        id
    }

    pub fn while_stmt(&mut self, test: Expr, body: StmtId, span: TextRange) -> StmtId {
        let id = self.push_stmt(Stmt::While(WhileStmt { test, body, span }));
        self.attach(body.into(), id.into());
        id
    }

    pub fn for_stmt(
        &mut self,
        init: Expr,
        test: Expr,
        step: Expr,
        body: StmtId,
        span: TextRange,
    ) -> StmtId {
        let id = self.push_stmt(Stmt::For(ForStmt {
            init,
            test,
            step,
            body,
            span,
        }));
        self.attach(body.into(), id.into());
        id
    }

    /// Allocate a switch statement.
    ///
    /// # Panics
    ///
    /// Panics if `cases` contains anything but [`Stmt::Case`] nodes or
    /// `default` is not a [`Stmt::Default`] node.
    pub fn switch_stmt(
        &mut self,
        expr: Expr,
        cases: Vec<StmtId>,
        default: Option<StmtId>,
        span: TextRange,
    ) -> StmtId {
        for &case in &cases {
            assert!(matches!(self.stmt(case), Stmt::Case(_)), "switch arm is not a case");
        }
        if let Some(default) = default {
            assert!(
                matches!(self.stmt(default), Stmt::Default(_)),
                "switch default is not a default label"
            );
        }
        let id = self.push_stmt(Stmt::Switch(SwitchStmt {
            expr,
            cases: cases.clone(),
            default,
            span,
        }));
        self.attach_all(cases.into_iter().chain(default).map(NodeRef::from), id);
        id
    }

    pub fn case(&mut self, label: Expr, body: Vec<StmtId>, span: TextRange) -> StmtId {
        let id = self.push_stmt(Stmt::Case(CaseStmt {
            label,
            body: body.clone(),
            span,
        }));
        self.attach_all(body.into_iter().map(NodeRef::from), id);
        id
    }

    pub fn default_case(&mut self, body: Vec<StmtId>, span: TextRange) -> StmtId {
        let id = self.push_stmt(Stmt::Default(DefaultStmt {
            body: body.clone(),
            span,
        }));
        self.attach_all(body.into_iter().map(NodeRef::from), id);
        id
    }

    pub fn break_stmt(&mut self, span: TextRange) -> StmtId {
        self.push_stmt(Stmt::Break(span))
    }

    pub fn continue_stmt(&mut self, span: TextRange) -> StmtId {
        self.push_stmt(Stmt::Continue(span))
    }

    pub fn return_stmt(&mut self, value: Option<Expr>, span: TextRange) -> StmtId {
        self.push_stmt(Stmt::Return(ReturnStmt { value, span }))
    }

    /// Build the translation-unit root from top-level declarations.
    pub fn program(&self, decls: Vec<DeclId>) -> Program {
        for &decl in &decls {
            assert!(
                self.decls[decl.index()].parent.is_none(),
                "top-level declaration {} is nested in another node",
                decl
            );
        }
        Program { decls }
    }

    fn push_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(self.stmts.len());
        self.stmts.push(Slot {
            node: stmt,
            parent: None,
        });
        id
    }

    fn attach_all(&mut self, children: impl Iterator<Item = NodeRef>, parent: StmtId) {
        for child in children {
            self.attach(child, parent.into());
        }
    }

    fn attach(&mut self, child: NodeRef, parent: NodeRef) {
        let slot = match child {
            NodeRef::Decl(id) => &mut self.decls[id.index()].parent,
            NodeRef::Stmt(id) => &mut self.stmts[id.index()].parent,
        };
        assert!(slot.is_none(), "{} already has a parent", child);
        *slot = Some(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name, TextRange::default())
    }

    #[test]
    fn test_children_link_to_parent() {
        let mut ast = Ast::new();
        let x = ast.var_decl(ident("x"), Some(Type::Int), None, None);
        let ret = ast.return_stmt(Some(Expr::var("x")), TextRange::default());
        let body = ast.block(vec![x], vec![ret], TextRange::default());
        let f = ast.fn_decl(ident("f"), Type::Int, None, vec![], TextRange::default());
        ast.set_function_body(f, body);

        assert_eq!(ast.parent(x.into()), Some(NodeRef::Stmt(body)));
        assert_eq!(ast.parent(body.into()), Some(NodeRef::Decl(f)));
        assert_eq!(ast.enclosing_function(ret.into()), Some(f));
        assert_eq!(ast.decl(f).as_fn().and_then(|f| f.body), Some(body));
    }

    #[test]
    #[should_panic(expected = "without a type or qualifier")]
    fn test_var_decl_requires_type_component() {
        let mut ast = Ast::new();
        ast.var_decl(ident("x"), None, None, Some(Expr::int(1)));
    }

    #[test]
    #[should_panic(expected = "already has a parent")]
    fn test_node_cannot_have_two_owners() {
        let mut ast = Ast::new();
        let brk = ast.break_stmt(TextRange::default());
        ast.block(vec![], vec![brk], TextRange::default());
        ast.block(vec![], vec![brk], TextRange::default());
    }

    #[test]
    #[should_panic(expected = "cannot take a body")]
    fn test_prototype_rejects_body() {
        let mut ast = Ast::new();
        let f = ast.fn_prototype(ident("f"), Type::Void, vec![], TextRange::default());
        let body = ast.block(vec![], vec![], TextRange::default());
        ast.set_function_body(f, body);
    }
}
