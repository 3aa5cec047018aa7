//! End-to-end tests for flowir
//!
//! These tests build procedures with the fluent builder, assemble them and
//! execute the artifact in the reference interpreter, verifying the results
//! are correct.

mod harness;
mod conditionals;
mod loops;
mod switches;
mod exceptions;
mod resources;

pub use harness::*;
