//! Resource regions
//!
//! Tests that a bound resource is disposed exactly once on every exit from
//! its body.

use super::harness::*;
use flowir::{Block, Expr, Type};
use flowir_eval::{EvalError, Interpreter, Value};
use pretty_assertions::assert_eq;

fn file() -> Type {
    Type::object("File")
}

fn open(class: &str) -> Expr {
    Expr::new_object(Type::object(class), vec![])
}

#[test]
fn test_dispose_on_normal_exit() {
    let mut flow = int_flow(&[]);
    flow.body()
        .using_resource("f", file(), open("File"))
        .unwrap()
        .assign("r", Type::Int, Expr::int(1))
        .unwrap()
        .end()
        .return_value(Type::Int, Expr::int(2))
        .unwrap();

    let mut interp = Interpreter::new();
    assert_eq!(run_in(&mut interp, &flow, &[]).unwrap(), Value::Int(2));
    assert_eq!(interp.dispose_log(), ["File"]);
}

#[test]
fn test_dispose_on_return() {
    let mut flow = int_flow(&[]);
    flow.body()
        .using_resource("f", file(), open("File"))
        .unwrap()
        .return_value(Type::Int, Expr::int(42))
        .unwrap()
        .end()
        .return_value(Type::Int, Expr::int(0))
        .unwrap();

    let mut interp = Interpreter::new();
    assert_eq!(run_in(&mut interp, &flow, &[]).unwrap(), Value::Int(42));
    assert_eq!(interp.dispose_log(), ["File"]);
}

#[test]
fn test_dispose_on_break() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("i", Type::Int, Expr::int(0))
        .unwrap()
        .loop_while(Expr::bool(true))
        .unwrap()
        .using_resource("f", file(), open("File"))
        .unwrap()
        .assign("i", Type::Int, int("i").add(Expr::int(1)))
        .unwrap()
        .if_test(int("i").equals(Expr::int(2)))
        .unwrap()
        .break_loop()
        .unwrap()
        .end()
        .end()
        .end()
        .return_value(Type::Int, int("i"))
        .unwrap();

    let mut interp = Interpreter::new();
    assert_eq!(run_in(&mut interp, &flow, &[]).unwrap(), Value::Int(2));
    // One resource per pass, each disposed once
    assert_eq!(interp.dispose_log(), ["File", "File"]);
}

#[test]
fn test_dispose_on_exception() {
    let mut flow = int_flow(&[]);
    flow.body()
        .using_resource("f", file(), open("File"))
        .unwrap()
        .act(Expr::int(1).div(Expr::int(0)))
        .unwrap()
        .end()
        .return_value(Type::Int, Expr::int(0))
        .unwrap();

    let mut interp = Interpreter::new();
    let result = run_in(&mut interp, &flow, &[]);
    assert!(matches!(result, Err(EvalError::Uncaught(_))));
    assert_eq!(interp.dispose_log(), ["File"]);
}

#[test]
fn test_null_resource_is_not_disposed() {
    let mut flow = int_flow(&[]);
    flow.body()
        .using_resource("f", file(), Expr::null(file()))
        .unwrap()
        .return_value(Type::Int, Expr::int(3))
        .unwrap()
        .end();

    let mut interp = Interpreter::new();
    assert_eq!(run_in(&mut interp, &flow, &[]).unwrap(), Value::Int(3));
    assert!(interp.dispose_log().is_empty());
}

#[test]
fn test_nested_resources_dispose_inner_first() {
    let mut flow = int_flow(&[]);
    flow.body()
        .using_resource("outer", Type::object("Outer"), open("Outer"))
        .unwrap()
        .using_resource("inner", Type::object("Inner"), open("Inner"))
        .unwrap()
        .return_value(Type::Int, Expr::int(1))
        .unwrap()
        .end()
        .end();

    let mut interp = Interpreter::new();
    run_in(&mut interp, &flow, &[]).unwrap();
    assert_eq!(interp.dispose_log(), ["Inner", "Outer"]);
}

#[test]
fn test_resource_visible_in_body() {
    let mut flow = int_flow(&[]);
    flow.body()
        .using_resource("f", file(), open("File"))
        .unwrap()
        .if_test(Expr::param("f", file()).not_equals(Expr::null(file())))
        .unwrap()
        .return_value(Type::Int, Expr::int(1))
        .unwrap()
        .end()
        .end()
        .return_value(Type::Int, Expr::int(0))
        .unwrap();
    expect_i32(&flow, 1);
}

#[test]
fn test_dispose_log_restarts_each_run() {
    let mut flow = int_flow(&[]);
    flow.body()
        .using_resource("f", file(), open("File"))
        .unwrap()
        .return_value(Type::Int, Expr::int(1))
        .unwrap()
        .end();

    let mut interp = Interpreter::new();
    run_in(&mut interp, &flow, &[]).unwrap();
    run_in(&mut interp, &flow, &[]).unwrap();
    assert_eq!(interp.dispose_log(), ["File"]);
}
