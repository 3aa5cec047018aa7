//! Switches
//!
//! Tests for case groups, empty groups falling through to the default and
//! default-only switches.

use super::harness::*;
use flowir::{Block, Expr, Type};

#[test]
fn test_switch_selects_group() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .declare("r", Type::Int)
        .unwrap()
        .switch_on(int("n"))
        .unwrap()
        .case(Expr::int(1))
        .unwrap()
        .begin()
        .assign("r", Type::Int, Expr::int(10))
        .unwrap()
        .end()
        .case(Expr::int(2))
        .unwrap()
        .case(Expr::int(3))
        .unwrap()
        .begin()
        .assign("r", Type::Int, Expr::int(20))
        .unwrap()
        .end()
        .default()
        .unwrap()
        .assign("r", Type::Int, Expr::int(-1))
        .unwrap()
        .end()
        .end()
        .return_value(Type::Int, int("r"))
        .unwrap();
    expect_i32_with(&flow, &[1], 10);
    expect_i32_with(&flow, &[2], 20);
    expect_i32_with(&flow, &[3], 20);
    expect_i32_with(&flow, &[9], -1);
}

#[test]
fn test_empty_group_falls_through_to_default() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .declare("r", Type::Int)
        .unwrap()
        .switch_on(int("n"))
        .unwrap()
        .case(Expr::int(1))
        .unwrap()
        .end()
        .case(Expr::int(2))
        .unwrap()
        .begin()
        .assign("r", Type::Int, Expr::int(2))
        .unwrap()
        .end()
        .default()
        .unwrap()
        .assign("r", Type::Int, int("r").add(Expr::int(100)))
        .unwrap()
        .end()
        .end()
        .return_value(Type::Int, int("r"))
        .unwrap();
    expect_i32_with(&flow, &[1], 100);
    expect_i32_with(&flow, &[2], 2);
    expect_i32_with(&flow, &[5], 100);
}

#[test]
fn test_default_only() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .switch_on(int("n"))
        .unwrap()
        .default()
        .unwrap()
        .return_value(Type::Int, int("n").add(Expr::int(1)))
        .unwrap()
        .end()
        .end();
    expect_i32_with(&flow, &[41], 42);
}

#[test]
fn test_no_match_without_default() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .assign("r", Type::Int, Expr::int(7))
        .unwrap()
        .switch_on(int("n"))
        .unwrap()
        .case(Expr::int(1))
        .unwrap()
        .begin()
        .assign("r", Type::Int, Expr::int(1))
        .unwrap()
        .end()
        .end()
        .return_value(Type::Int, int("r"))
        .unwrap();
    expect_i32_with(&flow, &[1], 1);
    expect_i32_with(&flow, &[2], 7);
}

#[test]
fn test_break_inside_case_leaves_loop() {
    let mut flow = int_flow(&[]);
    flow.body()
        .assign("i", Type::Int, Expr::int(0))
        .unwrap()
        .loop_while(Expr::bool(true))
        .unwrap()
        .assign("i", Type::Int, int("i").add(Expr::int(1)))
        .unwrap()
        .switch_on(int("i"))
        .unwrap()
        .case(Expr::int(3))
        .unwrap()
        .begin()
        .break_loop()
        .unwrap()
        .end()
        .end()
        .end()
        .return_value(Type::Int, int("i"))
        .unwrap();
    expect_i32(&flow, 3);
}
