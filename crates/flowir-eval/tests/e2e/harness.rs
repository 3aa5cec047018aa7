//! Test harness for end-to-end build and execution
//!
//! Assembles a `FlowBuilder` and runs the artifact in the reference
//! interpreter.

use flowir::{Artifact, Expr, FlowBuilder, Type};
use flowir_eval::{EvalError, EvalResult, Interpreter, Value};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once; `RUST_LOG=flowir=trace` shows builder traces
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Placeholder of type `int`
pub fn int(name: &str) -> Expr {
    Expr::param(name, Type::Int)
}

/// Builder for a procedure with int parameters returning int
pub fn int_flow(params: &[&str]) -> FlowBuilder {
    let params: Vec<(&str, Type)> = params.iter().map(|p| (*p, Type::Int)).collect();
    FlowBuilder::new(&params, Type::Int).unwrap()
}

/// Assemble, panicking with the build error on failure
pub fn assemble(flow: &FlowBuilder) -> Artifact {
    match flow.assemble() {
        Ok(artifact) => artifact,
        Err(e) => panic!("Assembly failed: {}", e),
    }
}

/// Run in a caller-provided interpreter (to inspect its dispose log or host)
pub fn run_in(interp: &mut Interpreter, flow: &FlowBuilder, args: &[Value]) -> EvalResult<Value> {
    init_tracing();
    interp.run(&assemble(flow), args)
}

/// Run in a fresh interpreter
pub fn run(flow: &FlowBuilder, args: &[Value]) -> EvalResult<Value> {
    run_in(&mut Interpreter::new(), flow, args)
}

/// Run with int arguments, expecting a specific i32 result
pub fn expect_i32_with(flow: &FlowBuilder, args: &[i32], expected: i32) {
    let args: Vec<Value> = args.iter().copied().map(Value::Int).collect();
    match run(flow, &args) {
        Ok(value) => {
            let actual = value
                .as_i32()
                .unwrap_or_else(|| panic!("Expected i32 result, got {:?}", value));
            assert_eq!(actual, expected, "Wrong result for args {:?}", args);
        }
        Err(e) => panic!("Execution failed: {}", e),
    }
}

/// Run without arguments, expecting a specific i32 result
pub fn expect_i32(flow: &FlowBuilder, expected: i32) {
    expect_i32_with(flow, &[], expected);
}

/// Run, expecting an exception to escape; returns the exception value
pub fn expect_uncaught(flow: &FlowBuilder, args: &[Value]) -> Value {
    match run(flow, args) {
        Err(EvalError::Uncaught(value)) => value,
        other => panic!("Expected an uncaught exception, got {:?}", other),
    }
}
