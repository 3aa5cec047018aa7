//! Loops and iteration
//!
//! Tests for pre-test, post-test and foreach loops, break and continue.

use super::harness::*;
use flowir::{Block, Expr, FlowBuilder, Type};
use flowir_eval::{Interpreter, Value};
use pretty_assertions::assert_eq;

// ============================================================================
// While Loops
// ============================================================================

#[test]
fn test_while_counts_to_three() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("x", Type::Int, Expr::int(0))
        .unwrap()
        .loop_while(int("x").lt(Expr::int(3)))
        .unwrap()
        .assign("x", Type::Int, int("x").add(Expr::int(1)))
        .unwrap()
        .end()
        .return_value(Type::Int, int("x"))
        .unwrap();
    expect_i32(&flow, 3);
}

#[test]
fn test_while_never_runs() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("x", Type::Int, Expr::int(0))
        .unwrap()
        .loop_while(Expr::bool(false))
        .unwrap()
        .assign("x", Type::Int, Expr::int(100))
        .unwrap()
        .end()
        .return_value(Type::Int, int("x"))
        .unwrap();
    expect_i32(&flow, 0);
}

#[test]
fn test_while_sum() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .assign("sum", Type::Int, Expr::int(0))
        .unwrap()
        .assign("i", Type::Int, Expr::int(1))
        .unwrap()
        .loop_while(int("i").le(int("n")))
        .unwrap()
        .assign("sum", Type::Int, int("sum").add(int("i")))
        .unwrap()
        .assign("i", Type::Int, int("i").add(Expr::int(1)))
        .unwrap()
        .end()
        .return_value(Type::Int, int("sum"))
        .unwrap();
    expect_i32_with(&flow, &[10], 55);
    expect_i32_with(&flow, &[0], 0);
}

// ============================================================================
// Do-While Loops
// ============================================================================

#[test]
fn test_do_while_runs_once() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("x", Type::Int, Expr::int(0))
        .unwrap()
        .loop_do_while(Expr::bool(false))
        .unwrap()
        .assign("x", Type::Int, int("x").add(Expr::int(1)))
        .unwrap()
        .end()
        .return_value(Type::Int, int("x"))
        .unwrap();
    expect_i32(&flow, 1);
}

#[test]
fn test_do_while_repeats() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("x", Type::Int, Expr::int(0))
        .unwrap()
        .loop_do_while(int("x").lt(Expr::int(5)))
        .unwrap()
        .assign("x", Type::Int, int("x").add(Expr::int(2)))
        .unwrap()
        .end()
        .return_value(Type::Int, int("x"))
        .unwrap();
    // 0 -> 2 -> 4 -> 6, tested after each pass
    expect_i32(&flow, 6);
}

#[test]
fn test_do_while_continue_tests_condition() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("x", Type::Int, Expr::int(0))
        .unwrap()
        .assign("y", Type::Int, Expr::int(0))
        .unwrap()
        .loop_do_while(int("x").lt(Expr::int(5)))
        .unwrap()
        .assign("x", Type::Int, int("x").add(Expr::int(1)))
        .unwrap()
        .if_test(int("x").lt(Expr::int(3)))
        .unwrap()
        .continue_loop()
        .unwrap()
        .end()
        .assign("y", Type::Int, int("y").add(Expr::int(1)))
        .unwrap()
        .end()
        .return_value(Type::Int, int("x").mul(Expr::int(10)).add(int("y")))
        .unwrap();
    // x reaches 5; y counts the passes with x of 3, 4 and 5
    expect_i32(&flow, 53);
}

#[test]
fn test_do_while_break() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("x", Type::Int, Expr::int(0))
        .unwrap()
        .loop_do_while(Expr::bool(true))
        .unwrap()
        .assign("x", Type::Int, int("x").add(Expr::int(1)))
        .unwrap()
        .if_test(int("x").equals(Expr::int(3)))
        .unwrap()
        .break_loop()
        .unwrap()
        .end()
        .end()
        .return_value(Type::Int, int("x"))
        .unwrap();
    expect_i32(&flow, 3);
}

// ============================================================================
// Break and Continue
// ============================================================================

#[test]
fn test_break_leaves_innermost_loop() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("count", Type::Int, Expr::int(0))
        .unwrap()
        .assign("i", Type::Int, Expr::int(0))
        .unwrap()
        .loop_while(int("i").lt(Expr::int(3)))
        .unwrap()
        .assign("i", Type::Int, int("i").add(Expr::int(1)))
        .unwrap()
        .assign("j", Type::Int, Expr::int(0))
        .unwrap()
        .loop_while(Expr::bool(true))
        .unwrap()
        .assign("j", Type::Int, int("j").add(Expr::int(1)))
        .unwrap()
        .if_test(int("j").equals(Expr::int(2)))
        .unwrap()
        .break_loop()
        .unwrap()
        .end()
        .assign("count", Type::Int, int("count").add(Expr::int(1)))
        .unwrap()
        .end()
        .end()
        .return_value(Type::Int, int("count"))
        .unwrap();
    // The inner loop counts once per outer pass
    expect_i32(&flow, 3);
}

#[test]
fn test_continue_skips_rest_of_body() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("sum", Type::Int, Expr::int(0))
        .unwrap()
        .assign("i", Type::Int, Expr::int(0))
        .unwrap()
        .loop_while(int("i").lt(Expr::int(5)))
        .unwrap()
        .assign("i", Type::Int, int("i").add(Expr::int(1)))
        .unwrap()
        .if_test(int("i").rem(Expr::int(2)).equals(Expr::int(0)))
        .unwrap()
        .continue_loop()
        .unwrap()
        .end()
        .assign("sum", Type::Int, int("sum").add(int("i")))
        .unwrap()
        .end()
        .return_value(Type::Int, int("sum"))
        .unwrap();
    // 1 + 3 + 5
    expect_i32(&flow, 9);
}

#[test]
fn test_return_from_loop() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("i", Type::Int, Expr::int(0))
        .unwrap()
        .loop_while(Expr::bool(true))
        .unwrap()
        .assign("i", Type::Int, int("i").add(Expr::int(1)))
        .unwrap()
        .if_test(int("i").ge(Expr::int(4)))
        .unwrap()
        .return_value(Type::Int, int("i").mul(Expr::int(10)))
        .unwrap()
        .end()
        .end()
        .return_value(Type::Int, Expr::int(-1))
        .unwrap();
    expect_i32(&flow, 40);
}

// ============================================================================
// Foreach
// ============================================================================

fn int_list(items: &[i32]) -> Expr {
    Expr::list(Type::Int, items.iter().copied().map(Expr::int).collect())
}

#[test]
fn test_foreach_list_sum_disposes_iterator() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("sum", Type::Int, Expr::int(0))
        .unwrap()
        .for_each("item", Type::Int, int_list(&[1, 2, 3, 4]))
        .unwrap()
        .assign("sum", Type::Int, int("sum").add(int("item")))
        .unwrap()
        .end()
        .return_value(Type::Int, int("sum"))
        .unwrap();

    let mut interp = Interpreter::new();
    let result = run_in(&mut interp, &flow, &[]).unwrap();
    assert_eq!(result, Value::Int(10));
    assert_eq!(interp.dispose_log(), ["iterator"]);
}

#[test]
fn test_foreach_range_is_not_disposed() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("sum", Type::Int, Expr::int(0))
        .unwrap()
        .for_each("i", Type::Int, Expr::range(Expr::int(0), Expr::int(4)))
        .unwrap()
        .assign("sum", Type::Int, int("sum").add(int("i")))
        .unwrap()
        .end()
        .return_value(Type::Int, int("sum"))
        .unwrap();

    let mut interp = Interpreter::new();
    assert_eq!(run_in(&mut interp, &flow, &[]).unwrap(), Value::Int(6));
    assert!(interp.dispose_log().is_empty());
}

#[test]
fn test_foreach_break_still_disposes() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("sum", Type::Int, Expr::int(0))
        .unwrap()
        .for_each("item", Type::Int, int_list(&[1, 2, 3]))
        .unwrap()
        .if_test(int("item").equals(Expr::int(2)))
        .unwrap()
        .break_loop()
        .unwrap()
        .end()
        .assign("sum", Type::Int, int("sum").add(int("item")))
        .unwrap()
        .end()
        .return_value(Type::Int, int("sum"))
        .unwrap();

    let mut interp = Interpreter::new();
    assert_eq!(run_in(&mut interp, &flow, &[]).unwrap(), Value::Int(1));
    assert_eq!(interp.dispose_log(), ["iterator"]);
}

#[test]
fn test_foreach_converts_elements() {
    let mut flow = FlowBuilder::new(&[], Type::Long).unwrap();
    flow.body()
        .assign("total", Type::Long, Expr::long(0))
        .unwrap()
        .for_each("v", Type::Long, int_list(&[1, 2, 3]))
        .unwrap()
        .assign(
            "total",
            Type::Long,
            Expr::param("total", Type::Long).add(Expr::param("v", Type::Long)),
        )
        .unwrap()
        .end()
        .return_value(Type::Long, Expr::param("total", Type::Long))
        .unwrap();
    assert_eq!(run(&flow, &[]).unwrap(), Value::Long(6));
}

#[test]
fn test_foreach_empty_collection() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("count", Type::Int, Expr::int(0))
        .unwrap()
        .for_each("item", Type::Int, int_list(&[]))
        .unwrap()
        .assign("count", Type::Int, int("count").add(Expr::int(1)))
        .unwrap()
        .end()
        .return_value(Type::Int, int("count"))
        .unwrap();
    expect_i32(&flow, 0);
}
