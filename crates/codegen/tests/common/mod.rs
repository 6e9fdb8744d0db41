//! Shared AST construction helpers for the integration tests.

#![allow(dead_code)]

use glint_ast::{Ast, DeclId, Expr, Identifier, Program, StmtId, Type, TypeQualifier};
use glint_codegen::ir::{Function, InstKind, Terminator};
use glint_codegen::{emit_program, EmitOutput, EmitterConfig};
use text_size::{TextRange, TextSize};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A distinct span per call site so diagnostics can be told apart.
pub fn span(start: u32) -> TextRange {
    TextRange::at(TextSize::from(start), TextSize::from(1))
}

pub fn ident(name: &str) -> Identifier {
    Identifier::new(name, TextRange::default())
}

pub fn var(ast: &mut Ast, name: &str, ty: Type, init: Option<Expr>) -> DeclId {
    ast.var_decl(ident(name), Some(ty), None, init)
}

pub fn const_var(ast: &mut Ast, name: &str, ty: Type, init: Expr) -> DeclId {
    ast.var_decl(ident(name), Some(ty), Some(TypeQualifier::constant(TextRange::default())), Some(init))
}

/// Define `ret name(formals) { decls; stmts }`.
pub fn function(
    ast: &mut Ast,
    name: &str,
    ret: Type,
    formals: &[(&str, Type)],
    decls: Vec<DeclId>,
    stmts: Vec<StmtId>,
) -> DeclId {
    let formals = formals
        .iter()
        .map(|&(n, ty)| var(ast, n, ty, None))
        .collect();
    let func = ast.fn_decl(ident(name), ret, None, formals, TextRange::default());
    let body = ast.block(decls, stmts, TextRange::default());
    ast.set_function_body(func, body);
    func
}

pub fn ret(ast: &mut Ast, value: Expr) -> StmtId {
    ast.return_stmt(Some(value), TextRange::default())
}

pub fn emit(ast: &Ast, program: &Program) -> EmitOutput {
    init_logger();
    emit_program(ast, program, &EmitterConfig::default()).expect("emission failed")
}

pub fn labels(func: &Function) -> Vec<&str> {
    func.blocks.iter().map(|b| b.label.as_str()).collect()
}

/// Label of the block an unconditional branch in `from` jumps to.
pub fn branch_target<'f>(func: &'f Function, from: &str) -> &'f str {
    let block = func.block_by_label(from).expect("no such block");
    match &block.terminator {
        Some(Terminator::Br { target }) => func.block(*target).label.as_str(),
        other => panic!("`{}` ends in {:?}, not a branch", from, other),
    }
}

pub fn count_allocas(func: &Function) -> usize {
    func.blocks
        .iter()
        .flat_map(|b| &b.instructions)
        .filter(|i| matches!(i.kind, InstKind::Alloca { .. }))
        .count()
}

pub fn codes(output: &EmitOutput) -> Vec<glint_ast::ErrorCode> {
    output.diagnostics.iter().filter_map(|d| d.code).collect()
}
