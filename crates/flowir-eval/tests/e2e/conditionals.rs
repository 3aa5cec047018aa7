//! Conditionals
//!
//! Tests for if, if-else and else-if chains.

use super::harness::*;
use flowir::{Block, Expr, Type};

#[test]
fn test_if_without_else() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .assign("r", Type::Int, Expr::int(1))
        .unwrap()
        .if_test(int("n").gt(Expr::int(10)))
        .unwrap()
        .assign("r", Type::Int, Expr::int(2))
        .unwrap()
        .end()
        .return_value(Type::Int, int("r"))
        .unwrap();
    expect_i32_with(&flow, &[5], 1);
    expect_i32_with(&flow, &[50], 2);
}

#[test]
fn test_if_else() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .if_test(int("n").rem(Expr::int(2)).equals(Expr::int(0)))
        .unwrap()
        .return_value(Type::Int, Expr::int(0))
        .unwrap()
        .else_()
        .unwrap()
        .return_value(Type::Int, Expr::int(1))
        .unwrap()
        .end();
    expect_i32_with(&flow, &[4], 0);
    expect_i32_with(&flow, &[7], 1);
}

#[test]
fn test_else_if_chain() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .declare("sign", Type::Int)
        .unwrap()
        .if_test(int("n").lt(Expr::int(0)))
        .unwrap()
        .assign("sign", Type::Int, Expr::int(-1))
        .unwrap()
        .else_if(int("n").equals(Expr::int(0)))
        .unwrap()
        .assign("sign", Type::Int, Expr::int(0))
        .unwrap()
        .else_()
        .unwrap()
        .assign("sign", Type::Int, Expr::int(1))
        .unwrap()
        .end()
        .return_value(Type::Int, int("sign"))
        .unwrap();
    expect_i32_with(&flow, &[-5], -1);
    expect_i32_with(&flow, &[0], 0);
    expect_i32_with(&flow, &[7], 1);
}

#[test]
fn test_nested_conditionals() {
    let mut flow = int_flow(&["a", "b"]);
    flow.body()
        .declare("r", Type::Int)
        .unwrap()
        .if_test(int("a").gt(Expr::int(0)))
        .unwrap()
        .if_test(int("b").gt(Expr::int(0)))
        .unwrap()
        .assign("r", Type::Int, Expr::int(11))
        .unwrap()
        .else_()
        .unwrap()
        .assign("r", Type::Int, Expr::int(10))
        .unwrap()
        .end()
        .else_()
        .unwrap()
        .assign("r", Type::Int, Expr::int(-1))
        .unwrap()
        .end()
        .return_value(Type::Int, int("r"))
        .unwrap();
    expect_i32_with(&flow, &[1, 1], 11);
    expect_i32_with(&flow, &[1, 0], 10);
    expect_i32_with(&flow, &[0, 1], -1);
}

#[test]
fn test_falling_off_the_end_returns_zero() {
    let mut flow = int_flow(&["n"]);
    flow.body()
        .if_test(int("n").gt(Expr::int(0)))
        .unwrap()
        .return_value(Type::Int, int("n"))
        .unwrap()
        .end();
    expect_i32_with(&flow, &[3], 3);
    expect_i32_with(&flow, &[-3], 0);
}
