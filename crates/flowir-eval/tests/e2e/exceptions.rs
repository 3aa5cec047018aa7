//! Exception handling
//!
//! Tests for try/catch/finally, throw and rethrow.

use super::harness::*;
use flowir::{Block, Expr, Type};
use flowir_eval::{HostFunctions, Interpreter, Value};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn arithmetic_error() -> Type {
    Type::object("ArithmeticError")
}

/// Interpreter whose `log(int)` host function appends to the returned vector
fn logging_interpreter() -> (Interpreter, Rc<RefCell<Vec<i32>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let mut host = HostFunctions::new();
    host.register("log", move |args| {
        if let [Value::Int(i)] = args {
            sink.borrow_mut().push(*i);
        }
        Ok(Value::Void)
    });
    (Interpreter::with_host(host), log)
}

fn log(value: i32) -> Expr {
    Expr::call("log", vec![Expr::int(value)], Type::Void)
}

// ============================================================================
// Catch
// ============================================================================

#[test]
fn test_catch_division_by_zero() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .assign("r", Type::Int, Expr::int(0))
        .unwrap()
        .try_block()
        .assign("r", Type::Int, Expr::int(10).div(int("n")))
        .unwrap()
        .catch(arithmetic_error(), None)
        .unwrap()
        .assign("r", Type::Int, Expr::int(-1))
        .unwrap()
        .end()
        .unwrap()
        .return_value(Type::Int, int("r"))
        .unwrap();
    expect_i32_with(&flow, &[2], 5);
    expect_i32_with(&flow, &[0], -1);
}

#[test]
fn test_catch_binds_exception() {
    let oops = Type::object("Oops");
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("r", Type::Int, Expr::int(0))
        .unwrap()
        .try_block()
        .throw_value(Expr::new_object(oops.clone(), vec![]))
        .unwrap()
        .catch(Type::Any, Some("e"))
        .unwrap()
        .if_test(Expr::param("e", Type::Any).not_equals(Expr::null(Type::Any)))
        .unwrap()
        .assign("r", Type::Int, Expr::int(1))
        .unwrap()
        .end()
        .end()
        .unwrap()
        .return_value(Type::Int, int("r"))
        .unwrap();
    expect_i32(&flow, 1);
}

#[test]
fn test_first_matching_handler_wins() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("r", Type::Int, Expr::int(0))
        .unwrap()
        .try_block()
        .act(Expr::int(1).rem(Expr::int(0)))
        .unwrap()
        .catch(Type::object("IoError"), None)
        .unwrap()
        .assign("r", Type::Int, Expr::int(1))
        .unwrap()
        .catch(arithmetic_error(), None)
        .unwrap()
        .assign("r", Type::Int, Expr::int(2))
        .unwrap()
        .catch(Type::Any, None)
        .unwrap()
        .assign("r", Type::Int, Expr::int(3))
        .unwrap()
        .end()
        .unwrap()
        .return_value(Type::Int, int("r"))
        .unwrap();
    expect_i32(&flow, 2);
}

#[test]
fn test_unmatched_exception_escapes() {
    let mut flow = int_flow(&[]);
    flow.body()
        .try_block()
        .throw_value(Expr::new_object(Type::object("Oops"), vec![]))
        .unwrap()
        .catch(arithmetic_error(), None)
        .unwrap()
        .return_value(Type::Int, Expr::int(1))
        .unwrap()
        .end()
        .unwrap()
        .return_value(Type::Int, Expr::int(0))
        .unwrap();
    let exception = expect_uncaught(&flow, &[]);
    assert_eq!(exception.class(), Some("Oops"));
}

#[test]
fn test_rethrow_escapes() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .try_block()
        .return_value(Type::Int, Expr::int(100).div(int("n")))
        .unwrap()
        .catch(arithmetic_error(), Some("e"))
        .unwrap()
        .rethrow()
        .unwrap()
        .end()
        .unwrap();
    expect_i32_with(&flow, &[4], 25);
    let exception = expect_uncaught(&flow, &[Value::Int(0)]);
    assert_eq!(exception.class(), Some("ArithmeticError"));
}

// ============================================================================
// Finally
// ============================================================================

#[test]
fn test_finally_runs_on_return() {
    let mut flow = int_flow(&[]);
    flow.body()
        .try_block()
        .return_value(Type::Int, Expr::int(5))
        .unwrap()
        .finally()
        .unwrap()
        .act(log(1))
        .unwrap()
        .end()
        .unwrap()
        .return_value(Type::Int, Expr::int(0))
        .unwrap();

    let (mut interp, log) = logging_interpreter();
    assert_eq!(run_in(&mut interp, &flow, &[]).unwrap(), Value::Int(5));
    assert_eq!(*log.borrow(), vec![1]);
}

#[test]
fn test_finally_runs_on_uncaught_exception() {
    let mut flow = int_flow(&[]);
    flow.body()
        .try_block()
        .throw_value(Expr::new_object(Type::object("Oops"), vec![]))
        .unwrap()
        .finally()
        .unwrap()
        .act(log(7))
        .unwrap()
        .end()
        .unwrap();

    let (mut interp, log) = logging_interpreter();
    let result = run_in(&mut interp, &flow, &[]);
    assert!(matches!(result, Err(flowir_eval::EvalError::Uncaught(_))));
    assert_eq!(*log.borrow(), vec![7]);
}

#[test]
fn test_catch_then_finally_order() {
    let mut flow = int_flow(&[]);
    flow.body()
        .try_block()
        .act(log(1))
        .unwrap()
        .act(Expr::int(1).div(Expr::int(0)))
        .unwrap()
        .act(log(99))
        .unwrap()
        .catch(arithmetic_error(), None)
        .unwrap()
        .act(log(2))
        .unwrap()
        .finally()
        .unwrap()
        .act(log(3))
        .unwrap()
        .end()
        .unwrap()
        .return_value(Type::Int, Expr::int(0))
        .unwrap();

    let (mut interp, log) = logging_interpreter();
    run_in(&mut interp, &flow, &[]).unwrap();
    assert_eq!(*log.borrow(), vec![1, 2, 3]);
}

#[test]
fn test_nested_try_rethrow_reaches_outer_handler() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("r", Type::Int, Expr::int(0))
        .unwrap()
        .try_block()
        .try_block()
        .act(Expr::int(1).div(Expr::int(0)))
        .unwrap()
        .catch(arithmetic_error(), None)
        .unwrap()
        .assign("r", Type::Int, Expr::int(1))
        .unwrap()
        .rethrow()
        .unwrap()
        .end()
        .unwrap()
        .catch(Type::Any, None)
        .unwrap()
        .assign("r", Type::Int, int("r").add(Expr::int(10)))
        .unwrap()
        .end()
        .unwrap()
        .return_value(Type::Int, int("r"))
        .unwrap();
    expect_i32(&flow, 11);
}
