use criterion::{Criterion, criterion_group, criterion_main};
use glint_ast::{Ast, BinaryOp, ComparisonOp, DeclId, Expr, Identifier, Program, Type};
use glint_codegen::{EmitterConfig, emit_program};
use std::hint::black_box;
use text_size::TextRange;

fn ident(name: &str) -> Identifier {
    Identifier::new(name, TextRange::default())
}

/// `int fN(int n) { int s = 0; int i; for (i = 0; i < n; i = i + 1) { if (i == 3) continue; s = s + i; } return s; }`
fn loop_function(ast: &mut Ast, index: usize) -> DeclId {
    let n = ast.var_decl(ident("n"), Some(Type::Int), None, None);
    let s = ast.var_decl(ident("s"), Some(Type::Int), None, Some(Expr::int(0)));
    let i = ast.var_decl(ident("i"), Some(Type::Int), None, None);

    let cont = ast.continue_stmt(TextRange::default());
    let test = Expr::compare(ComparisonOp::Eq, Expr::var("i"), Expr::int(3));
    let skip = ast.if_stmt(test, cont, None, TextRange::default());
    let acc = ast.expr_stmt(Expr::assign(
        "s",
        Expr::binary(BinaryOp::Add, Expr::var("s"), Expr::var("i")),
    ));
    let body = ast.block(vec![], vec![skip, acc], TextRange::default());
    let for_stmt = ast.for_stmt(
        Expr::assign("i", Expr::int(0)),
        Expr::compare(ComparisonOp::Lt, Expr::var("i"), Expr::var("n")),
        Expr::assign("i", Expr::binary(BinaryOp::Add, Expr::var("i"), Expr::int(1))),
        body,
        TextRange::default(),
    );
    let ret = ast.return_stmt(Some(Expr::var("s")), TextRange::default());

    let func = ast.fn_decl(
        ident(&format!("f{}", index)),
        Type::Int,
        None,
        vec![n],
        TextRange::default(),
    );
    let block = ast.block(vec![s, i], vec![for_stmt, ret], TextRange::default());
    ast.set_function_body(func, block);
    func
}

fn program(functions: usize) -> (Ast, Program) {
    let mut ast = Ast::new();
    let mut decls = Vec::with_capacity(functions + 1);
    decls.push(ast.var_decl(ident("g"), Some(Type::Int), None, Some(Expr::int(5))));
    for index in 0..functions {
        decls.push(loop_function(&mut ast, index));
    }
    let program = ast.program(decls);
    (ast, program)
}

fn bench_emit_small(c: &mut Criterion) {
    let (ast, program) = program(1);
    let config = EmitterConfig::default();
    c.bench_function("emit_small", |b| {
        b.iter(|| black_box(emit_program(black_box(&ast), &program, &config)));
    });
}

fn bench_emit_many_functions(c: &mut Criterion) {
    let (ast, program) = program(200);
    let config = EmitterConfig::default();
    c.bench_function("emit_many_functions", |b| {
        b.iter(|| black_box(emit_program(black_box(&ast), &program, &config)));
    });
}

fn bench_emit_without_verify(c: &mut Criterion) {
    let (ast, program) = program(200);
    let mut config = EmitterConfig::default();
    config.verify = false;
    c.bench_function("emit_without_verify", |b| {
        b.iter(|| black_box(emit_program(black_box(&ast), &program, &config)));
    });
}

criterion_group!(
    benches,
    bench_emit_small,
    bench_emit_many_functions,
    bench_emit_without_verify
);
criterion_main!(benches);
