//! Declaration Emission Tests
//!
//! Placement and binding of declarations:
//! - Globals at module scope, stack slots everywhere else
//! - Formal parameters spilled in order
//! - Shadowing and same-scope redeclaration
//! - Function prototypes, redefinitions and conflicts

mod common;

use common::*;
use glint_ast::{Ast, BinaryOp, ErrorCode, Expr, ExprKind, Identifier, Type, TypeQualifier};
use glint_codegen::compile;
use glint_codegen::ir::{Constant, InstKind, IrType, Module, Value};
use text_size::TextRange;

/// Names of the functions called from `caller`, in emission order.
fn callees<'m>(module: &'m Module, caller: &str) -> Vec<&'m str> {
    let caller = module.get_function(caller).expect("no such function");
    caller
        .blocks
        .iter()
        .flat_map(|b| &b.instructions)
        .filter_map(|i| match &i.kind {
            InstKind::Call { callee, .. } => Some(module.function(*callee).name.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_global_and_function_printed() {
    let mut ast = Ast::new();
    let g = var(&mut ast, "g", Type::Int, Some(Expr::int(5)));
    let r = var(&mut ast, "r", Type::Int, Some(Expr::var("n")));
    let ret_r = ret(&mut ast, Expr::var("r"));
    let f = function(&mut ast, "f", Type::Int, &[("n", Type::Int)], vec![r], vec![ret_r]);
    let program = ast.program(vec![g, f]);

    let module = compile(&ast, &program).expect("program should compile");
    let expected = "\
; ModuleID = 'irgen.bc'
@g = global i32 5

define i32 @f(i32 %n) {
entry:
  %n.1 = alloca i32
  store i32 %n, ptr %n.1
  %r = alloca i32
  %n.2 = load i32, ptr %n.1
  store i32 %n.2, ptr %r
  %r.1 = load i32, ptr %r
  ret i32 %r.1
}
";
    assert_eq!(module.to_string(), expected);
}

#[test]
fn test_module_scope_variables_become_globals() {
    let mut ast = Ast::new();
    let a = var(&mut ast, "a", Type::Float, None);
    let c = const_var(&mut ast, "c", Type::Int, Expr::int(3));
    let program = ast.program(vec![a, c]);

    let output = emit(&ast, &program);
    assert!(!output.has_errors());

    let a = output.module.get_global("a").unwrap();
    assert_eq!(a.ty, IrType::F32);
    assert!(!a.is_constant);
    assert_eq!(a.initializer, Constant::Float(0.0));

    let c = output.module.get_global("c").unwrap();
    assert!(c.is_constant);
    assert_eq!(c.initializer, Constant::Int(3));
    assert!(output.module.to_string().contains("@c = constant i32 3"));
}

#[test]
fn test_function_locals_become_stack_slots() {
    let mut ast = Ast::new();
    let x = var(&mut ast, "x", Type::Int, Some(Expr::int(1)));
    let y = var(&mut ast, "y", Type::Bool, None);
    let ret_x = ret(&mut ast, Expr::var("x"));
    let f = function(&mut ast, "f", Type::Int, &[], vec![x, y], vec![ret_x]);
    let program = ast.program(vec![f]);

    let output = emit(&ast, &program);
    assert!(output.module.globals.is_empty());
    let f = output.module.get_function("f").unwrap();
    assert_eq!(count_allocas(f), 2);
    assert!(output.module.to_string().contains("store i1 false, ptr %y"));
}

#[test]
fn test_formals_spilled_in_declaration_order() {
    let mut ast = Ast::new();
    let ret_a = ret(&mut ast, Expr::var("a"));
    let f = function(
        &mut ast,
        "f",
        Type::Int,
        &[("a", Type::Int), ("b", Type::Float)],
        vec![],
        vec![ret_a],
    );
    let program = ast.program(vec![f]);

    let output = emit(&ast, &program);
    let f = output.module.get_function("f").unwrap();
    assert_eq!(f.param_names, vec!["a", "b"]);

    let entry = &f.blocks[0];
    let kinds: Vec<_> = entry.instructions.iter().take(4).map(|i| &i.kind).collect();
    assert!(matches!(kinds[0], InstKind::Alloca { allocated: IrType::I32 }));
    assert!(matches!(kinds[1], InstKind::Store { value: Value::Arg(0), .. }));
    assert!(matches!(kinds[2], InstKind::Alloca { allocated: IrType::F32 }));
    assert!(matches!(kinds[3], InstKind::Store { value: Value::Arg(1), .. }));
    // Slots take the formal's name, uniqued after the argument itself.
    assert_eq!(entry.instructions[0].name.as_deref(), Some("a.1"));
    assert_eq!(entry.instructions[2].name.as_deref(), Some("b.1"));
}

#[test]
fn test_local_shadows_global() {
    let mut ast = Ast::new();
    let global_x = var(&mut ast, "x", Type::Int, Some(Expr::int(1)));
    let local_x = var(&mut ast, "x", Type::Int, Some(Expr::int(2)));
    let ret_x = ret(&mut ast, Expr::var("x"));
    let f = function(&mut ast, "f", Type::Int, &[], vec![local_x], vec![ret_x]);
    let program = ast.program(vec![global_x, f]);

    let output = emit(&ast, &program);
    assert!(!output.has_errors());
    let text = output.module.to_string();
    assert!(text.contains("%x.1 = load i32, ptr %x\n"));
    assert!(!text.contains("ptr @x"));
}

#[test]
fn test_inner_block_binding_ends_with_block() {
    let mut ast = Ast::new();
    let inner_a = var(&mut ast, "a", Type::Int, Some(Expr::int(2)));
    let inner = ast.block(vec![inner_a], vec![], TextRange::default());
    let ret_a = ret(&mut ast, Expr::var("a"));
    let f = function(&mut ast, "f", Type::Int, &[("a", Type::Int)], vec![], vec![inner, ret_a]);
    let program = ast.program(vec![f]);

    let output = emit(&ast, &program);
    assert!(!output.has_errors());
    let f = output.module.get_function("f").unwrap();
    assert_eq!(count_allocas(f), 2);
    // The return reads the parameter, not the inner binding.
    assert!(output.module.to_string().contains("%a.3 = load i32, ptr %a.1\n"));
}

#[test]
fn test_duplicate_in_same_scope_reported() {
    let mut ast = Ast::new();
    let first = var(&mut ast, "a", Type::Int, None);
    let second = var(&mut ast, "a", Type::Int, None);
    let f = function(&mut ast, "f", Type::Void, &[], vec![first, second], vec![]);
    let program = ast.program(vec![f]);

    let output = emit(&ast, &program);
    assert_eq!(codes(&output), vec![ErrorCode::E3002]);
    assert_eq!(count_allocas(output.module.get_function("f").unwrap()), 1);
}

#[test]
fn test_global_initializer_folds_constant_globals() {
    let mut ast = Ast::new();
    let c = const_var(&mut ast, "c", Type::Int, Expr::int(2));
    let d = var(
        &mut ast,
        "d",
        Type::Int,
        Some(Expr::binary(BinaryOp::Mul, Expr::var("c"), Expr::int(3))),
    );
    let program = ast.program(vec![c, d]);

    let output = emit(&ast, &program);
    assert!(!output.has_errors());
    assert_eq!(output.module.get_global("d").unwrap().initializer, Constant::Int(6));
}

#[test]
fn test_non_constant_global_initializer_reported() {
    let mut ast = Ast::new();
    let g = var(&mut ast, "g", Type::Int, Some(Expr::int(1)));
    let h = var(&mut ast, "h", Type::Int, Some(Expr::var("g")));
    let program = ast.program(vec![g, h]);

    let output = emit(&ast, &program);
    assert_eq!(codes(&output), vec![ErrorCode::E4020]);
    // The global still exists so later uses resolve.
    assert_eq!(output.module.get_global("h").unwrap().initializer, Constant::Int(0));
}

#[test]
fn test_qualifier_only_declaration_takes_initializer_type() {
    let mut ast = Ast::new();
    let c = ast.var_decl(
        ident("c"),
        None,
        Some(TypeQualifier::constant(TextRange::default())),
        Some(Expr::float(2.5)),
    );
    let program = ast.program(vec![c]);

    let output = emit(&ast, &program);
    assert!(!output.has_errors());
    assert_eq!(output.module.get_global("c").unwrap().ty, IrType::F32);
}

#[test]
fn test_prototype_then_definition() {
    let mut ast = Ast::new();
    let proto_x = var(&mut ast, "x", Type::Int, None);
    let proto = ast.fn_prototype(ident("sq"), Type::Int, vec![proto_x], TextRange::default());
    let call = ret(&mut ast, Expr::call("sq", vec![Expr::int(3)]));
    let main = function(&mut ast, "main", Type::Int, &[], vec![], vec![call]);
    let body = ret(&mut ast, Expr::binary(BinaryOp::Mul, Expr::var("x"), Expr::var("x")));
    let sq = function(&mut ast, "sq", Type::Int, &[("x", Type::Int)], vec![], vec![body]);
    let program = ast.program(vec![proto, main, sq]);

    let output = emit(&ast, &program);
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert_eq!(output.module.functions.len(), 2);
    let sq = output.module.get_function("sq").unwrap();
    assert!(!sq.is_declaration());
    assert_eq!(sq.signature.to_string(), "i32 (i32)");
    assert!(output.module.to_string().contains("call i32 @sq(i32 3)"));
}

#[test]
fn test_prototype_without_definition_stays_declared() {
    let mut ast = Ast::new();
    let x = var(&mut ast, "x", Type::Float, None);
    let proto = ast.fn_prototype(ident("ext"), Type::Void, vec![x], TextRange::default());
    let program = ast.program(vec![proto]);

    let output = emit(&ast, &program);
    assert!(output.module.get_function("ext").unwrap().is_declaration());
    assert!(output.module.to_string().contains("declare void @ext(float %arg0)"));
}

#[test]
fn test_conflicting_function_declaration_reported() {
    let mut ast = Ast::new();
    let x = var(&mut ast, "x", Type::Int, None);
    let proto = ast.fn_prototype(ident("h"), Type::Int, vec![x], TextRange::default());
    let body = ret(&mut ast, Expr::float(1.0));
    let h = function(&mut ast, "h", Type::Float, &[("x", Type::Int)], vec![], vec![body]);
    let program = ast.program(vec![proto, h]);

    let output = emit(&ast, &program);
    assert_eq!(codes(&output), vec![ErrorCode::E3005]);
    assert!(output.module.get_function("h").unwrap().is_declaration());
}

#[test]
fn test_function_redefinition_reported() {
    let mut ast = Ast::new();
    let first = function(&mut ast, "k", Type::Void, &[], vec![], vec![]);
    let second = function(&mut ast, "k", Type::Void, &[], vec![], vec![]);
    let program = ast.program(vec![first, second]);

    let output = emit(&ast, &program);
    assert_eq!(codes(&output), vec![ErrorCode::E3006]);
    assert_eq!(output.module.get_function("k").unwrap().blocks.len(), 1);
}

#[test]
fn test_undeclared_identifier_recovers() {
    let mut ast = Ast::new();
    let y = Expr::new(ExprKind::Var(Identifier::new("y", span(10))), span(10));
    let body = ret(&mut ast, y);
    let f = function(&mut ast, "f", Type::Int, &[], vec![], vec![body]);
    let program = ast.program(vec![f]);

    let output = emit(&ast, &program);
    assert_eq!(codes(&output), vec![ErrorCode::E3001, ErrorCode::W3102]);
    assert_eq!(output.diagnostics[0].span, span(10));

    let diagnostics = compile(&ast, &program).unwrap_err();
    assert_eq!(diagnostics.len(), 2);
}

#[test]
fn test_nested_function_resolves_in_enclosing_block() {
    let mut ast = Ast::new();
    let a = var(&mut ast, "a", Type::Int, Some(Expr::int(1)));
    let inner_ret = ret(&mut ast, Expr::var("a"));
    let g = function(&mut ast, "g", Type::Int, &[], vec![], vec![inner_ret]);
    let outer_ret = ret(&mut ast, Expr::call("g", vec![]));
    let f = function(&mut ast, "f", Type::Int, &[], vec![a, g], vec![outer_ret]);
    let program = ast.program(vec![f]);

    let output = emit(&ast, &program);
    // `g` cannot read the stack slot of `f`.
    assert_eq!(codes(&output), vec![ErrorCode::E3007, ErrorCode::W3102]);
    let names: Vec<_> = output.module.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["f", "g"]);
    assert!(output.module.to_string().contains("call i32 @g()"));
}

#[test]
fn test_nested_function_shadows_outer_with_other_signature() {
    let mut ast = Ast::new();
    let outer_body = ret(&mut ast, Expr::int(1));
    let outer_h = function(&mut ast, "h", Type::Int, &[], vec![], vec![outer_body]);
    let inner_body = ret(&mut ast, Expr::float(1.0));
    let inner_h = function(&mut ast, "h", Type::Float, &[("x", Type::Int)], vec![], vec![inner_body]);
    let f_ret = ret(&mut ast, Expr::int(0));
    let f = function(&mut ast, "f", Type::Int, &[], vec![inner_h], vec![f_ret]);
    let program = ast.program(vec![outer_h, f]);

    let output = emit(&ast, &program);
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    let names: Vec<_> = output.module.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["h", "f", "h.1"]);
    assert_eq!(output.module.get_function("h").unwrap().signature.to_string(), "i32 ()");
    assert_eq!(output.module.get_function("h.1").unwrap().signature.to_string(), "float (i32)");
}

#[test]
fn test_nested_function_with_same_signature_is_a_new_function() {
    let mut ast = Ast::new();
    let outer_body = ret(&mut ast, Expr::int(1));
    let outer_h = function(&mut ast, "h", Type::Int, &[], vec![], vec![outer_body]);
    let inner_body = ret(&mut ast, Expr::int(2));
    let inner_h = function(&mut ast, "h", Type::Int, &[], vec![], vec![inner_body]);
    let f_ret = ret(&mut ast, Expr::call("h", vec![]));
    let f = function(&mut ast, "f", Type::Int, &[], vec![inner_h], vec![f_ret]);
    let k_ret = ret(&mut ast, Expr::call("h", vec![]));
    let k = function(&mut ast, "k", Type::Int, &[], vec![], vec![k_ret]);
    let program = ast.program(vec![outer_h, f, k]);

    let output = emit(&ast, &program);
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    // Inside `f` the nested definition wins; outside it the outer one is back.
    assert_eq!(callees(&output.module, "f"), vec!["h.1"]);
    assert_eq!(callees(&output.module, "k"), vec!["h"]);
    assert!(!output.module.get_function("h.1").unwrap().is_declaration());
}

#[test]
fn test_nested_helpers_in_sibling_functions_stay_apart() {
    let mut ast = Ast::new();
    let mut outer = Vec::new();
    for (name, value) in [("f", 1), ("g", 2)] {
        let body = ret(&mut ast, Expr::int(value));
        let helper = function(&mut ast, "helper", Type::Int, &[], vec![], vec![body]);
        let call = ret(&mut ast, Expr::call("helper", vec![]));
        outer.push(function(&mut ast, name, Type::Int, &[], vec![helper], vec![call]));
    }
    let program = ast.program(outer);

    let output = emit(&ast, &program);
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert_eq!(callees(&output.module, "f"), vec!["helper"]);
    assert_eq!(callees(&output.module, "g"), vec!["helper.1"]);
}
